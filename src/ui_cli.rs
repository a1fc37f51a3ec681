use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::app::{AppError, Session};
use crate::config::Config;
use crate::i18n::{keys, Translator};
use crate::material::Material;
use crate::prediction::FULL_DOMAIN;
use crate::report::format_humidity;

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    SelectMaterial,
    SetHumidity,
    Predict,
    SaveChart,
    Settings,
    Exit,
}

/// 입력/출력 스트림을 묶은 대화형 콘솔.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, line: &str) -> Result<(), AppError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    fn read_line(&mut self, prompt: &str) -> Result<String, AppError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "입력이 끝났습니다.",
            )));
        }
        Ok(buf)
    }

    fn read_f64(&mut self, tr: &Translator, prompt: &str) -> Result<f64, AppError> {
        loop {
            let s = self.read_line(prompt)?;
            match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => return Ok(v),
                _ => self.say(&tr.t(keys::ERROR_INVALID_NUMBER))?,
            }
        }
    }

    /// 메인 메뉴를 표시하고 선택값을 반환한다.
    pub fn main_menu(&mut self, tr: &Translator, session: &Session) -> Result<MenuChoice, AppError> {
        self.say(&tr.t(keys::MENU_TITLE))?;
        let material = tr.t(&format!("material.{}", session.material.key()));
        self.say(&tr.tf(
            keys::MENU_CURRENT,
            &[
                ("material", material),
                ("humidity", format_humidity(session.humidity)),
            ],
        ))?;
        for key in [
            keys::MENU_SELECT_MATERIAL,
            keys::MENU_SET_HUMIDITY,
            keys::MENU_PREDICT,
            keys::MENU_SAVE_CHART,
            keys::MENU_SETTINGS,
            keys::MENU_EXIT,
        ] {
            self.say(&tr.t(key))?;
        }
        loop {
            let sel = self.read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
            match sel.trim() {
                "1" => return Ok(MenuChoice::SelectMaterial),
                "2" => return Ok(MenuChoice::SetHumidity),
                "3" => return Ok(MenuChoice::Predict),
                "4" => return Ok(MenuChoice::SaveChart),
                "5" => return Ok(MenuChoice::Settings),
                "0" => return Ok(MenuChoice::Exit),
                _ => self.say(&tr.t(keys::INVALID_SELECTION_RETRY))?,
            }
        }
    }

    /// 난연제 목록에서 하나를 고른다. 빈 입력이면 현재 선택을 유지한다.
    pub fn select_material(&mut self, tr: &Translator, current: Material) -> Result<Material, AppError> {
        self.say(&tr.t(keys::PROMPT_MATERIAL))?;
        for (i, m) in Material::ALL.iter().enumerate() {
            self.say(&format!("{}) {}", i + 1, tr.t(&format!("material.{}", m.key()))))?;
        }
        loop {
            let sel = self.read_line(&tr.t(keys::PROMPT_SELECT))?;
            let sel = sel.trim();
            if sel.is_empty() {
                return Ok(current);
            }
            let picked = sel
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| Material::ALL.get(i).copied());
            match picked {
                Some(m) => return Ok(m),
                None => self.say(&tr.t(keys::INVALID_SELECTION_RETRY))?,
            }
        }
    }

    /// 0~100 범위의 습도를 받을 때까지 다시 묻는다.
    pub fn read_humidity(&mut self, tr: &Translator) -> Result<f64, AppError> {
        loop {
            let h = self.read_f64(tr, &tr.t(keys::PROMPT_HUMIDITY))?;
            if FULL_DOMAIN.contains(&h) {
                return Ok(h);
            }
            self.say(&tr.t(keys::ERROR_HUMIDITY_BOUNDS))?;
        }
    }

    pub fn read_chart_path(&mut self, tr: &Translator, default: &str) -> Result<PathBuf, AppError> {
        let prompt = tr.tf(keys::PROMPT_CHART_PATH, &[("default", default.to_string())]);
        let s = self.read_line(&prompt)?;
        let s = s.trim();
        Ok(PathBuf::from(if s.is_empty() { default } else { s }))
    }

    /// 설정 메뉴를 처리한다. 언어가 바뀌면 true.
    pub fn handle_settings(&mut self, tr: &Translator, cfg: &mut Config) -> Result<bool, AppError> {
        self.say(&tr.t(keys::SETTINGS_HEADING))?;
        self.say(&tr.tf(
            keys::SETTINGS_CURRENT_LANGUAGE,
            &[("lang", cfg.language.clone())],
        ))?;
        self.say(&tr.t(keys::SETTINGS_OPTIONS))?;
        let sel = self.read_line(&tr.t(keys::SETTINGS_PROMPT_CHANGE))?;
        let lang = match sel.trim() {
            "" => return Ok(false),
            "1" => "auto",
            "2" => "ko",
            "3" => "en-us",
            _ => {
                self.say(&tr.t(keys::SETTINGS_INVALID))?;
                return Ok(false);
            }
        };
        let changed = cfg.language != lang;
        cfg.language = lang.to_string();
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn humidity_prompt_retries_until_in_bounds() {
        let tr = Translator::new("ko");
        let mut c = console("abc\n150\n-1\n55.5\n");
        assert_eq!(c.read_humidity(&tr).unwrap(), 55.5);
        let out = String::from_utf8(c.into_output()).unwrap();
        assert!(out.contains("숫자를 입력하세요."));
        assert_eq!(out.matches("0~100% 사이").count(), 2);
    }

    #[test]
    fn material_selection_by_number() {
        let tr = Translator::new("ko");
        let mut c = console("9\n3\n");
        let m = c.select_material(&tr, Material::Untreated).unwrap();
        assert_eq!(m, Material::SodiumAlginate);
    }

    #[test]
    fn empty_selection_keeps_current() {
        let tr = Translator::new("ko");
        let mut c = console("\n");
        let m = c.select_material(&tr, Material::PolyvinylAlcohol).unwrap();
        assert_eq!(m, Material::PolyvinylAlcohol);
    }

    #[test]
    fn eof_is_an_io_error() {
        let tr = Translator::new("ko");
        let mut c = console("");
        assert!(matches!(c.read_humidity(&tr), Err(AppError::Io(_))));
    }

    #[test]
    fn settings_switch_language() {
        let tr = Translator::new("ko");
        let mut cfg = Config::default();
        let mut c = console("3\n");
        assert!(c.handle_settings(&tr, &mut cfg).unwrap());
        assert_eq!(cfg.language, "en-us");
    }
}
