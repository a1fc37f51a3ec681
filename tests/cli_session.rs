//! 대화형 CLI 세션 시나리오 테스트.
use std::io::Cursor;

use char_length_predictor::{
    app, config,
    i18n::Translator,
    material::Material,
    prediction::PredictionRequest,
    ui_cli::Console,
};

fn run_session(input: &str) -> (String, config::Config, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cfg = config::load_from(dir.path().join("config.toml")).expect("config");
    cfg.language = "ko".into();
    let mut tr = Translator::new("ko");
    let mut console = Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
    app::run(&mut console, &mut cfg, &mut tr).expect("session");
    let out = String::from_utf8(console.into_output()).expect("utf8");
    (out, cfg, dir)
}

#[test]
fn predict_with_defaults_then_exit() {
    let (out, _, _dir) = run_session("3\n0\n");
    assert!(out.contains("- 예상 탄화 길이: 6.18 cm"));
    assert!(!out.contains("⚠️"));
    assert!(out.contains("프로그램을 종료합니다."));
}

#[test]
fn change_material_and_humidity_out_of_range() {
    let (out, cfg, dir) = run_session("1\n3\n2\n100\n3\n0\n");
    assert!(out.contains("- 선택한 난연제 종류: 알긴산 나트륨 기반 난연제"));
    assert!(out.contains("- 예상 탄화 길이: 3.71 cm"));
    assert!(out.contains("⚠️"));
    // 종료 시 마지막 선택을 저장한다.
    assert_eq!(cfg.material(), Ok(Material::SodiumAlginate));
    let saved = config::load_from(dir.path().join("config.toml")).expect("reload");
    assert_eq!(saved.default_humidity, 100.0);
}

#[test]
fn save_chart_from_menu() {
    let dir = tempfile::tempdir().expect("tempdir");
    let chart = dir.path().join("chart.png");
    let (out, _, _cfg_dir) = run_session(&format!("4\n{}\n0\n", chart.display()));
    assert!(chart.exists());
    assert!(out.contains("그래프를 저장했습니다"));
}

#[test]
fn switch_language_to_english() {
    let (out, cfg, _dir) = run_session("5\n3\n3\n0\n");
    assert_eq!(cfg.language, "en-us");
    assert!(out.contains("Settings saved."));
    assert!(out.contains("- Predicted char length: 6.18 cm"));
    assert!(out.contains("Exiting."));
}

#[test]
fn one_shot_with_chart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let chart = dir.path().join("one.png");
    let cfg = config::Config::default();
    let tr = Translator::new("en");
    let mut out = Vec::new();
    let req = PredictionRequest::new(Material::PolyvinylAlcohol, 0.0);
    app::run_once(&mut out, &cfg, &tr, req, Some(&chart)).expect("run once");
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("2.67 cm"));
    assert!(text.contains("outside the experimental range"));
    assert!(chart.exists());
}

#[test]
fn settings_without_change_are_not_saved() {
    // 빈 입력(취소), 현재와 같은 언어, 잘못된 번호 모두 저장하지 않는다.
    let (out, cfg, _dir) = run_session("5\n\n5\n2\n5\n9\n0\n");
    assert_eq!(cfg.language, "ko");
    assert!(!out.contains("설정을 저장했습니다."));
    assert!(out.contains("잘못된 입력이므로 변경하지 않습니다."));
    assert!(out.contains("프로그램을 종료합니다."));
}
