//! 비교 그래프의 그리기 독립적인 데이터 모델.
//!
//! GUI(egui 페인터)와 PNG 내보내기가 같은 `ChartSpec`을 그린다.

use crate::i18n::{keys, Translator};
use crate::material::Material;
use crate::prediction::{self, PredictionRequest, FULL_DOMAIN};

/// 8비트 RGB 색상.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const LIGHT_GRAY: Rgb = Rgb(211, 211, 211);

    /// matplotlib 이름 색상 중 이 프로그램이 쓰는 것만 해석한다.
    pub fn from_name(name: &str) -> Option<Rgb> {
        let rgb = match name.to_ascii_lowercase().as_str() {
            "black" => Rgb::BLACK,
            "white" => Rgb::WHITE,
            "red" => Rgb::RED,
            "gray" | "grey" => Rgb::GRAY,
            "lightgray" | "lightgrey" => Rgb::LIGHT_GRAY,
            "blue" => Rgb(0, 0, 255),
            "orange" => Rgb(255, 165, 0),
            "green" => Rgb(0, 128, 0),
            _ => return None,
        };
        Some(rgb)
    }
}

#[derive(Debug, Clone)]
pub struct LineSeries {
    /// None이면 범례에 표시하지 않는다.
    pub label: Option<String>,
    pub color: Rgb,
    pub dashed: bool,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Axis {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl Axis {
    /// 값을 축 범위 기준 0~1 비율로 바꾼다.
    pub fn fraction(&self, v: f64) -> f64 {
        (v - self.min) / (self.max - self.min)
    }
}

/// 범례 한 줄.
#[derive(Debug, Clone, PartialEq)]
pub enum LegendEntry<'a> {
    Line { label: &'a str, color: Rgb },
    Point { label: &'a str, color: Rgb },
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub lines: Vec<LineSeries>,
    pub point: ScatterPoint,
    pub grid: bool,
}

/// 세로축(탄화 길이) 표시 범위(cm).
pub const Y_RANGE: (f64, f64) = (0.0, 10.0);

impl ChartSpec {
    /// 난연제별 회귀선(전체 구간 흐린 선 + 실험 구간 색 선)과 현재 예측점을 담은 그래프를 만든다.
    pub fn build(request: PredictionRequest, sample_count: usize, tr: &Translator) -> Self {
        let mut lines = Vec::with_capacity(Material::ALL.len() * 2);
        for material in Material::ALL {
            let profile = material.profile();
            lines.push(LineSeries {
                label: None,
                color: Rgb::LIGHT_GRAY,
                dashed: true,
                points: prediction::full_domain_line(material, sample_count).collect(),
            });
            let name = tr.t(&format!("material.{}", material.key()));
            lines.push(LineSeries {
                label: Some(tr.tf(keys::CHART_REGRESSION_LABEL, &[("name", name)])),
                color: Rgb::from_name(profile.display_color).unwrap_or(Rgb::BLACK),
                dashed: true,
                points: prediction::validated_line(material, sample_count).collect(),
            });
        }

        let result = request.evaluate();
        let point = ScatterPoint {
            x: request.humidity,
            y: result.predicted_value,
            color: point_color(result.within_valid_range),
            label: tr.t(keys::CHART_POINT_LABEL),
        };

        Self {
            title: tr.t(keys::CHART_TITLE),
            x_axis: Axis {
                label: tr.t(keys::CHART_X_LABEL),
                min: *FULL_DOMAIN.start(),
                max: *FULL_DOMAIN.end(),
            },
            y_axis: Axis {
                label: tr.t(keys::CHART_Y_LABEL),
                min: Y_RANGE.0,
                max: Y_RANGE.1,
            },
            lines,
            point,
            grid: true,
        }
    }

    /// 라벨이 있는 선을 순서대로, 마지막에 예측점을 나열한다.
    pub fn legend_entries(&self) -> Vec<LegendEntry<'_>> {
        let mut out: Vec<LegendEntry<'_>> = self
            .lines
            .iter()
            .filter_map(|l| {
                l.label.as_deref().map(|label| LegendEntry::Line {
                    label,
                    color: l.color,
                })
            })
            .collect();
        out.push(LegendEntry::Point {
            label: &self.point.label,
            color: self.point.color,
        });
        out
    }
}

/// 실험 구간 안이면 빨강, 밖이면 회색.
pub fn point_color(within_valid_range: bool) -> Rgb {
    if within_valid_range {
        Rgb::RED
    } else {
        Rgb::GRAY
    }
}
