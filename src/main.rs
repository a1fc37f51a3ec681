use std::path::PathBuf;

use clap::Parser;
use char_length_predictor::{
    app::{self, AppError},
    config, i18n,
    material::Material,
    prediction::{PredictionRequest, FULL_DOMAIN},
    ui_cli::Console,
};

/// 난연제 종류와 습도로 탄화 길이를 예측한다.
#[derive(Debug, Parser)]
#[command(name = "char_length_predictor_cli", version)]
struct Cli {
    /// 난연제 이름 또는 키(untreated, pva, alginate)
    #[arg(short, long)]
    material: Option<String>,
    /// 습도(%), 0~100
    #[arg(short = 'H', long, value_parser = parse_humidity)]
    humidity: Option<f64>,
    /// 비교 그래프를 PNG로 저장할 경로
    #[arg(short, long)]
    chart: Option<PathBuf>,
    /// 언어(auto/ko/en-us)
    #[arg(short = 'L', long)]
    lang: Option<String>,
    /// 난연제 목록과 회귀 계수를 출력한다
    #[arg(long)]
    list: bool,
    /// 설정 파일 경로
    #[arg(long, default_value = config::CONFIG_FILE)]
    config: PathBuf,
}

fn parse_humidity(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if FULL_DOMAIN.contains(&v) {
        Ok(v)
    } else {
        Err(format!("0~100 범위가 아닙니다: {v}"))
    }
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    let cli = Cli::parse();
    if let Err(err) = try_run(cli) {
        log::error!("{err}");
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn try_run(cli: Cli) -> Result<(), AppError> {
    let mut cfg = config::load_from(&cli.config)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log_level))
        .init();

    let lang = i18n::resolve_language(
        cli.lang.as_deref().unwrap_or("auto"),
        Some(cfg.language.as_str()),
    );
    let mut tr = i18n::Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());
    log::debug!("language resolved to {lang}");

    let mut stdout = std::io::stdout();
    if cli.list {
        return app::print_materials(&mut stdout, &tr);
    }

    if cli.material.is_some() || cli.humidity.is_some() || cli.chart.is_some() {
        let material = match cli.material.as_deref() {
            Some(name) => Material::from_name(name)?,
            None => cfg.material()?,
        };
        let humidity = cli.humidity.unwrap_or_else(|| cfg.humidity());
        let request = PredictionRequest::new(material, humidity);
        return app::run_once(&mut stdout, &cfg, &tr, request, cli.chart.as_deref());
    }

    let mut console = Console::stdio();
    app::run(&mut console, &mut cfg, &mut tr)
}
