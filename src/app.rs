use std::io::{BufRead, Write};
use std::path::Path;

use crate::chart::ChartSpec;
use crate::config::{Config, ConfigError};
use crate::i18n::{self, keys, Translator};
use crate::material::{Material, UnknownMaterial};
use crate::prediction::{PredictionRequest, FULL_DOMAIN};
use crate::render::{self, RenderError};
use crate::report::Report;
use crate::ui_cli::{Console, MenuChoice};

/// 그래프 저장 경로 기본값.
pub const DEFAULT_CHART_PATH: &str = "char_length_chart.png";

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum AppError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// 설정 저장/로드 오류
    Config(ConfigError),
    /// 테이블에 없는 난연제
    Material(UnknownMaterial),
    /// 그래프 저장 오류
    Render(RenderError),
    /// 0~100 밖의 습도
    HumidityOutOfBounds(f64),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Io(e) => write!(f, "입출력 오류: {e}"),
            AppError::Config(e) => write!(f, "설정 오류: {e}"),
            AppError::Material(e) => write!(f, "난연제 오류: {e}"),
            AppError::Render(e) => write!(f, "그래프 오류: {e}"),
            AppError::HumidityOutOfBounds(h) => {
                write!(f, "습도는 0~100% 사이여야 합니다: {h}")
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        AppError::Config(value)
    }
}

impl From<UnknownMaterial> for AppError {
    fn from(value: UnknownMaterial) -> Self {
        AppError::Material(value)
    }
}

impl From<RenderError> for AppError {
    fn from(value: RenderError) -> Self {
        AppError::Render(value)
    }
}

/// 습도 입력이 0~100 범위인지 검사한다.
pub fn check_humidity(humidity: f64) -> Result<f64, AppError> {
    if FULL_DOMAIN.contains(&humidity) {
        Ok(humidity)
    } else {
        Err(AppError::HumidityOutOfBounds(humidity))
    }
}

/// 대화형 메뉴에서 유지하는 현재 선택.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub material: Material,
    pub humidity: f64,
}

impl Session {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            material: config.material()?,
            humidity: config.humidity(),
        })
    }

    pub fn request(&self) -> PredictionRequest {
        PredictionRequest::new(self.material, self.humidity)
    }
}

/// 보고서와 (필요하면) 경고를 출력한다.
pub fn print_report<W: Write>(out: &mut W, tr: &Translator, report: &Report) -> Result<(), AppError> {
    writeln!(out, "{}", report.render(tr))?;
    if let Some(warning) = report.warning(tr) {
        log::warn!(
            "humidity {} outside validated range",
            report.request.humidity
        );
        writeln!(out, "{warning}")?;
    }
    Ok(())
}

/// 현재 요청에 대한 비교 그래프를 PNG로 저장한다.
pub fn save_chart(
    config: &Config,
    tr: &Translator,
    request: PredictionRequest,
    path: &Path,
) -> Result<(), AppError> {
    let spec = ChartSpec::build(request, config.sample_count, tr);
    render::save_png(&spec, path, config.chart_width, config.chart_height)?;
    Ok(())
}

/// 한 번 예측하고 결과를 출력한다. `chart`가 있으면 그래프도 저장한다.
pub fn run_once<W: Write>(
    out: &mut W,
    config: &Config,
    tr: &Translator,
    request: PredictionRequest,
    chart: Option<&Path>,
) -> Result<(), AppError> {
    let humidity = check_humidity(request.humidity)?;
    log::debug!("predict {} at {humidity}%", request.material.key());
    let report = Report::evaluate(request);
    print_report(out, tr, &report)?;
    if let Some(path) = chart {
        save_chart(config, tr, request, path)?;
        writeln!(
            out,
            "{}",
            tr.tf(keys::CHART_SAVED, &[("path", path.display().to_string())])
        )?;
    }
    Ok(())
}

/// 난연제 목록과 회귀 계수를 출력한다.
pub fn print_materials<W: Write>(out: &mut W, tr: &Translator) -> Result<(), AppError> {
    for (i, m) in Material::ALL.iter().enumerate() {
        let p = m.profile();
        writeln!(
            out,
            "{}) [{}] {} (slope={}, intercept={}, color={})",
            i + 1,
            m.key(),
            tr.t(&format!("material.{}", m.key())),
            p.slope,
            p.intercept,
            p.display_color
        )?;
    }
    Ok(())
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    config: &mut Config,
    tr: &mut Translator,
) -> Result<(), AppError> {
    let mut session = Session::from_config(config)?;
    console.say(&tr.t(keys::APP_TITLE))?;
    console.say(&tr.t(keys::APP_INTRO))?;
    loop {
        match console.main_menu(tr, &session)? {
            MenuChoice::SelectMaterial => {
                session.material = console.select_material(tr, session.material)?;
            }
            MenuChoice::SetHumidity => {
                session.humidity = console.read_humidity(tr)?;
            }
            MenuChoice::Predict => {
                let report = Report::evaluate(session.request());
                print_report(console.out(), tr, &report)?;
            }
            MenuChoice::SaveChart => {
                let path = console.read_chart_path(tr, DEFAULT_CHART_PATH)?;
                save_chart(config, tr, session.request(), &path)?;
                console.say(&tr.tf(keys::CHART_SAVED, &[("path", path.display().to_string())]))?;
            }
            MenuChoice::Settings => {
                if console.handle_settings(tr, config)? {
                    let resolved = i18n::resolve_language(&config.language, None);
                    *tr = Translator::new_with_pack(&resolved, config.language_pack_dir.as_deref());
                    config.save()?;
                    console.say(&tr.t(keys::SETTINGS_SAVED))?;
                }
            }
            MenuChoice::Exit => {
                config.default_material = session.material.name().to_string();
                config.default_humidity = session.humidity;
                config.save()?;
                console.say(&tr.t(keys::APP_EXIT))?;
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_once_prints_warning_out_of_range() {
        let cfg = Config::default();
        let tr = Translator::new("ko");
        let mut out = Vec::new();
        let req = PredictionRequest::new(Material::SodiumAlginate, 100.0);
        run_once(&mut out, &cfg, &tr, req, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("3.71 cm"));
        assert!(text.contains("⚠️"));
    }

    #[test]
    fn run_once_rejects_humidity_above_100() {
        let cfg = Config::default();
        let tr = Translator::new("ko");
        let req = PredictionRequest::new(Material::Untreated, 100.5);
        let err = run_once(&mut Vec::new(), &cfg, &tr, req, None).unwrap_err();
        assert!(matches!(err, AppError::HumidityOutOfBounds(h) if h == 100.5));
    }

    #[test]
    fn session_uses_config_defaults() {
        let mut cfg = Config::default();
        cfg.default_material = "alginate".into();
        cfg.default_humidity = 140.0;
        let s = Session::from_config(&cfg).unwrap();
        assert_eq!(s.material, Material::SodiumAlginate);
        assert_eq!(s.humidity, 100.0);
    }

    #[test]
    fn oversized_chart_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.chart_width = u32::MAX;
        cfg.chart_height = u32::MAX;
        let tr = Translator::new("ko");
        let req = PredictionRequest::new(Material::Untreated, 40.0);
        let path = dir.path().join("huge.png");
        let err = run_once(&mut Vec::new(), &cfg, &tr, req, Some(&path)).unwrap_err();
        assert!(matches!(err, AppError::Render(RenderError::TooLarge { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn materials_listing_has_three_rows() {
        let mut out = Vec::new();
        print_materials(&mut out, &Translator::new("en")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("[pva]"));
    }
}
