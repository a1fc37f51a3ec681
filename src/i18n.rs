use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";

    pub const APP_TITLE: &str = "app.title";
    pub const APP_INTRO: &str = "app.intro";

    pub const MENU_TITLE: &str = "menu.title";
    pub const MENU_CURRENT: &str = "menu.current";
    pub const MENU_SELECT_MATERIAL: &str = "menu.select_material";
    pub const MENU_SET_HUMIDITY: &str = "menu.set_humidity";
    pub const MENU_PREDICT: &str = "menu.predict";
    pub const MENU_SAVE_CHART: &str = "menu.save_chart";
    pub const MENU_SETTINGS: &str = "menu.settings";
    pub const MENU_EXIT: &str = "menu.exit";

    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const PROMPT_SELECT: &str = "prompt.select";
    pub const PROMPT_MATERIAL: &str = "prompt.material";
    pub const PROMPT_HUMIDITY: &str = "prompt.humidity";
    pub const PROMPT_CHART_PATH: &str = "prompt.chart_path";

    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";
    pub const ERROR_INVALID_NUMBER: &str = "error.invalid_number";
    pub const ERROR_HUMIDITY_BOUNDS: &str = "error.humidity_bounds";

    pub const REPORT_HEADING: &str = "report.heading";
    pub const REPORT_MATERIAL: &str = "report.material";
    pub const REPORT_HUMIDITY: &str = "report.humidity";
    pub const REPORT_PREDICTED: &str = "report.predicted";
    pub const REPORT_WARNING: &str = "report.warning";

    pub const CHART_TITLE: &str = "chart.title";
    pub const CHART_X_LABEL: &str = "chart.x_label";
    pub const CHART_Y_LABEL: &str = "chart.y_label";
    pub const CHART_REGRESSION_LABEL: &str = "chart.regression_label";
    pub const CHART_POINT_LABEL: &str = "chart.point_label";
    pub const CHART_SAVED: &str = "chart.saved";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_CURRENT_LANGUAGE: &str = "settings.current_language";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_CHANGE: &str = "settings.prompt_change";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";

    pub const GUI_MATERIAL_LABEL: &str = "gui.material_label";
    pub const GUI_HUMIDITY_LABEL: &str = "gui.humidity_label";
    pub const GUI_SAVE_CHART: &str = "gui.save_chart";
    pub const GUI_SETTINGS_BUTTON: &str = "gui.settings_button";
    pub const GUI_ABOUT: &str = "gui.about";
    pub const GUI_CHART_ERROR: &str = "gui.chart_error";
    pub const GUI_FONT_MISSING: &str = "gui.font_missing";
    pub const GUI_SETTINGS_LANG: &str = "gui.settings.lang";
    pub const GUI_SETTINGS_LANG_AUTO: &str = "gui.settings.lang_auto";
    pub const GUI_SETTINGS_ALPHA: &str = "gui.settings.alpha";
    pub const GUI_SETTINGS_FONT: &str = "gui.settings.font";
    pub const GUI_SETTINGS_FONT_BROWSE: &str = "gui.settings.font_browse";
    pub const GUI_SETTINGS_SAVE: &str = "gui.settings.save";
    pub const GUI_SETTINGS_SAVED: &str = "gui.settings.saved";

    /// 내장 언어팩이 모두 갖춰야 하는 키 목록.
    pub const ALL: &[&str] = &[
        ERROR_PREFIX,
        APP_EXIT,
        APP_TITLE,
        APP_INTRO,
        MENU_TITLE,
        MENU_CURRENT,
        MENU_SELECT_MATERIAL,
        MENU_SET_HUMIDITY,
        MENU_PREDICT,
        MENU_SAVE_CHART,
        MENU_SETTINGS,
        MENU_EXIT,
        PROMPT_MENU_SELECT,
        PROMPT_SELECT,
        PROMPT_MATERIAL,
        PROMPT_HUMIDITY,
        PROMPT_CHART_PATH,
        INVALID_SELECTION_RETRY,
        ERROR_INVALID_NUMBER,
        ERROR_HUMIDITY_BOUNDS,
        REPORT_HEADING,
        REPORT_MATERIAL,
        REPORT_HUMIDITY,
        REPORT_PREDICTED,
        REPORT_WARNING,
        CHART_TITLE,
        CHART_X_LABEL,
        CHART_Y_LABEL,
        CHART_REGRESSION_LABEL,
        CHART_POINT_LABEL,
        CHART_SAVED,
        SETTINGS_HEADING,
        SETTINGS_CURRENT_LANGUAGE,
        SETTINGS_OPTIONS,
        SETTINGS_PROMPT_CHANGE,
        SETTINGS_INVALID,
        SETTINGS_SAVED,
        GUI_MATERIAL_LABEL,
        GUI_HUMIDITY_LABEL,
        GUI_SAVE_CHART,
        GUI_SETTINGS_BUTTON,
        GUI_ABOUT,
        GUI_CHART_ERROR,
        GUI_FONT_MISSING,
        GUI_SETTINGS_LANG,
        GUI_SETTINGS_LANG_AUTO,
        GUI_SETTINGS_ALPHA,
        GUI_SETTINGS_FONT,
        GUI_SETTINGS_FONT_BROWSE,
        GUI_SETTINGS_SAVE,
        GUI_SETTINGS_SAVED,
    ];
}

const KO_PACK: &str = include_str!("../locales/ko-kr.toml");
const EN_PACK: &str = include_str!("../locales/en-us.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("en") {
            Language::En
        } else {
            Language::Ko
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    built_in: HashMap<String, String>,
    fallback: HashMap<String, String>,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 ko로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        let lang = Language::from_code(lang_code);
        Self {
            lang,
            built_in: built_in_pack(lang),
            fallback: built_in_pack(Language::Ko),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        if overrides.is_some() {
            log::debug!("language pack override loaded for {lang_code}");
        }
        Self {
            overrides,
            ..Self::new(lang_code)
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn language_code(&self) -> &'static str {
        self.lang.as_code()
    }

    /// 키를 조회해 문자열을 반환한다. 어느 언어팩에도 없으면 None.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.overrides
            .as_ref()
            .and_then(|m| m.get(key))
            .or_else(|| self.built_in.get(key))
            .or_else(|| self.fallback.get(key))
            .cloned()
    }

    /// 번역을 가져온다. 어디에도 없으면 키 자체를 돌려준다.
    pub fn t(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_string())
    }

    /// 번역 후 `{name}` 자리표시자를 채운다.
    pub fn tf(&self, key: &str, vars: &[(&str, String)]) -> String {
        fill(&self.t(key), vars)
    }
}

/// 템플릿의 `{key}`를 값으로 치환한다.
pub fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "ko".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko".into()),
        "en" => Some("en-us".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(lang) = get_locale().as_deref().and_then(normalize_locale_string) {
        return Some(lang);
    }
    ["LANG", "LC_ALL"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|v| normalize_locale_string(&v))
}

/// TOML 기반 언어팩을 로드한다. 형식: 중첩 테이블은 `a.b` 형태의 키로 평탄화한다.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., en-us)
    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    // 2) base code (e.g., en)
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// 바이너리에 포함된 언어팩.
fn built_in_pack(lang: Language) -> HashMap<String, String> {
    let src = match lang {
        Language::Ko => KO_PACK,
        Language::En => EN_PACK,
    };
    parse_toml_to_map(src).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_packs_cover_every_key() {
        for lang in [Language::Ko, Language::En] {
            let pack = built_in_pack(lang);
            for key in keys::ALL {
                assert!(pack.contains_key(*key), "{lang:?} pack missing {key}");
            }
        }
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let tr = Translator::new("ko");
        assert_eq!(tr.t("no.such.key"), "no.such.key");
        assert!(tr.lookup("no.such.key").is_none());
    }

    #[test]
    fn english_and_korean_differ() {
        let ko = Translator::new("ko-kr");
        let en = Translator::new("en-us");
        assert_eq!(ko.language(), Language::Ko);
        assert_eq!(en.language_code(), "en");
        assert_ne!(ko.t(keys::CHART_TITLE), en.t(keys::CHART_TITLE));
    }

    #[test]
    fn fill_replaces_placeholders() {
        let s = fill("{a} + {b} = {a}{b}", &[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(s, "1 + 2 = 12");
    }

    #[test]
    fn cli_flag_wins_over_config() {
        assert_eq!(resolve_language("en", Some("ko")), "en-us");
        assert_eq!(resolve_language("auto", Some("ko-KR")), "ko");
    }

    #[test]
    fn pack_dir_overrides_single_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ko.toml"),
            "[chart]\ntitle = \"사용자 제목\"\n",
        )
        .unwrap();
        let tr = Translator::new_with_pack("ko", dir.path().to_str());
        assert_eq!(tr.t(keys::CHART_TITLE), "사용자 제목");
        assert_eq!(tr.t(keys::CHART_POINT_LABEL), "예측점");
    }
}
