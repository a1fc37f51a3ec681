use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::material::{Material, UnknownMaterial};
use crate::prediction::{DEFAULT_HUMIDITY, DEFAULT_SAMPLE_COUNT};
use crate::render::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// 기본 설정 파일 경로(작업 디렉터리 기준).
pub const CONFIG_FILE: &str = "config.toml";

/// 애플리케이션 설정을 표현한다. 파일에 없는 항목은 기본값으로 채운다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드(auto/ko/en-us)
    pub language: String,
    /// 사용자 언어팩 디렉터리
    pub language_pack_dir: Option<String>,
    /// 시작 시 선택할 난연제 이름
    pub default_material: String,
    pub default_humidity: f64,
    /// 회귀선 샘플 점 수
    pub sample_count: usize,
    pub chart_width: u32,
    pub chart_height: u32,
    pub window_alpha: f32,
    /// 한글 표시용 사용자 폰트(.ttf/.ttc)
    pub font_path: Option<String>,
    /// env_logger 기본 필터
    pub log_level: String,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            language_pack_dir: None,
            default_material: Material::Untreated.name().into(),
            default_humidity: DEFAULT_HUMIDITY,
            sample_count: DEFAULT_SAMPLE_COUNT,
            chart_width: DEFAULT_WIDTH,
            chart_height: DEFAULT_HEIGHT,
            window_alpha: 1.0,
            font_path: None,
            log_level: "info".into(),
            path: None,
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug)]
pub enum ConfigError {
    /// 파일 입출력 오류
    Io(std::io::Error),
    /// TOML 역직렬화 오류
    Serde(toml::de::Error),
    /// TOML 직렬화 오류
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "파일 입출력 오류: {e}"),
            ConfigError::Serde(e) => write!(f, "설정 파싱 오류: {e}"),
            ConfigError::Serialize(e) => write!(f, "설정 직렬화 오류: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Serde(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        ConfigError::Serialize(value)
    }
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_from(CONFIG_FILE)
}

/// 지정한 경로의 설정을 로드한다. 파일이 없으면 기본값을 그 경로에 저장한다.
pub fn load_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str::<Config>(&content)?
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        log::info!("created default config at {}", path.display());
        cfg
    };
    cfg.path = Some(path.to_path_buf());
    Ok(cfg)
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 로드했던 파일(없으면 config.toml)에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        self.save_to(path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        save_config(self, path.as_ref())?;
        log::debug!("config saved to {}", path.as_ref().display());
        Ok(())
    }

    /// 기본 난연제를 테이블에서 찾는다.
    pub fn material(&self) -> Result<Material, UnknownMaterial> {
        Material::from_name(&self.default_material)
    }

    /// 기본 습도를 0~100 범위로 맞춘다. 유한하지 않은 값(nan, inf)은 기본값 40%.
    pub fn humidity(&self) -> f64 {
        if self.default_humidity.is_finite() {
            self.default_humidity.clamp(0.0, 100.0)
        } else {
            DEFAULT_HUMIDITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.default_humidity, 40.0);
        assert_eq!(cfg.sample_count, 200);
        assert_eq!(cfg.material(), Ok(Material::Untreated));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "language = \"en\"\ndefault_humidity = 75.0\n").unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.humidity(), 75.0);
        assert_eq!(cfg.chart_width, 700);
    }

    #[test]
    fn save_round_trips_to_loaded_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.toml");
        let mut cfg = load_from(&path).unwrap();
        cfg.default_material = "pva".into();
        cfg.save().unwrap();
        let back = load_from(&path).unwrap();
        assert_eq!(back.material(), Ok(Material::PolyvinylAlcohol));
    }

    #[test]
    fn unknown_default_material_is_reported() {
        let cfg = Config {
            default_material: "모름".into(),
            ..Config::default()
        };
        assert!(cfg.material().is_err());
    }

    #[test]
    fn non_finite_default_humidity_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_humidity = nan\n").unwrap();
        let cfg = load_from(&path).unwrap();
        assert!(cfg.default_humidity.is_nan());
        assert_eq!(cfg.humidity(), 40.0);

        let mut cfg = Config::default();
        cfg.default_humidity = f64::INFINITY;
        assert_eq!(cfg.humidity(), 40.0);
        cfg.default_humidity = -5.0;
        assert_eq!(cfg.humidity(), 0.0);
    }

    #[test]
    fn broken_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "sample_count = \"many\"").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Serde(_))));
    }
}
