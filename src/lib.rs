//! 난연제 탄화 길이 예측기.
//! 예측 로직을 라이브러리로 분리하여 CLI와 GUI가 같은 계산을 공유한다.

pub mod app;
pub mod chart;
pub mod config;
pub mod i18n;
pub mod material;
pub mod prediction;
pub mod render;
pub mod report;
pub mod ui_cli;
