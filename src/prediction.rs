//! 습도에 따른 탄화 길이 예측.
//!
//! 모든 함수는 순수 함수이며 상태를 갖지 않는다. 습도가 실험 영역을 벗어나도 오류가 아니라
//! 결과의 `within_valid_range` 플래그로만 표시한다.

use std::ops::RangeInclusive;

use crate::material::{Material, UnknownMaterial};

/// 입력 가능한 습도 전체 구간(%).
pub const FULL_DOMAIN: RangeInclusive<f64> = 0.0..=100.0;
/// 실험 데이터가 수집된 습도 구간(%). 양 끝 포함.
pub const VALIDATED_RANGE: RangeInclusive<f64> = 20.0..=60.0;
pub const DEFAULT_HUMIDITY: f64 = 40.0;
/// 회귀선 한 개당 샘플 점 수.
pub const DEFAULT_SAMPLE_COUNT: usize = 200;

/// 한 번의 예측 요청. 사용자 입력마다 만들고 버린다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRequest {
    pub material: Material,
    /// 0~100 범위는 호출 측(슬라이더/CLI 검사)이 보장한다.
    pub humidity: f64,
}

impl PredictionRequest {
    pub fn new(material: Material, humidity: f64) -> Self {
        Self { material, humidity }
    }

    pub fn evaluate(&self) -> PredictionResult {
        predict(self.material, self.humidity)
    }
}

/// 예측 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// 예상 탄화 길이(cm). 반올림하지 않은 값.
    pub predicted_value: f64,
    /// 습도가 20~60% 안에 있으면 true
    pub within_valid_range: bool,
}

/// `slope * humidity + intercept`로 탄화 길이를 예측한다.
pub fn predict(material: Material, humidity: f64) -> PredictionResult {
    PredictionResult {
        predicted_value: material.profile().char_length_at(humidity),
        within_valid_range: is_within_valid_range(humidity),
    }
}

/// 이름으로 난연제를 찾아 예측한다. 테이블에 없는 이름이면 `UnknownMaterial`.
pub fn predict_by_name(name: &str, humidity: f64) -> Result<PredictionResult, UnknownMaterial> {
    let material = Material::from_name(name)?;
    Ok(predict(material, humidity))
}

pub fn is_within_valid_range(humidity: f64) -> bool {
    VALIDATED_RANGE.contains(&humidity)
}

/// `[domain_start, domain_end]`를 `sample_count`개로 균등 분할한 회귀선 점 시퀀스.
///
/// 지연 계산되며 `clone()`으로 처음부터 다시 순회할 수 있다.
pub fn regression_line(
    material: Material,
    domain_start: f64,
    domain_end: f64,
    sample_count: usize,
) -> RegressionLine {
    RegressionLine {
        material,
        start: domain_start,
        end: domain_end,
        count: sample_count,
        front: 0,
        back: sample_count,
    }
}

/// 전체 구간(0~100%) 회귀선.
pub fn full_domain_line(material: Material, sample_count: usize) -> RegressionLine {
    regression_line(material, *FULL_DOMAIN.start(), *FULL_DOMAIN.end(), sample_count)
}

/// 실험 구간(20~60%) 회귀선.
pub fn validated_line(material: Material, sample_count: usize) -> RegressionLine {
    regression_line(
        material,
        *VALIDATED_RANGE.start(),
        *VALIDATED_RANGE.end(),
        sample_count,
    )
}

#[derive(Debug, Clone)]
pub struct RegressionLine {
    material: Material,
    start: f64,
    end: f64,
    count: usize,
    front: usize,
    back: usize,
}

impl RegressionLine {
    fn x_at(&self, i: usize) -> f64 {
        // 마지막 점은 부동소수 누적 오차 없이 끝값과 정확히 일치시킨다.
        if i + 1 == self.count && self.count > 1 {
            return self.end;
        }
        if self.count <= 1 {
            return self.start;
        }
        let step = (self.end - self.start) / (self.count - 1) as f64;
        self.start + step * i as f64
    }

    fn point_at(&self, i: usize) -> (f64, f64) {
        let x = self.x_at(i);
        (x, self.material.profile().char_length_at(x))
    }
}

impl Iterator for RegressionLine {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let p = self.point_at(self.front);
        self.front += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for RegressionLine {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.point_at(self.back))
    }
}

impl ExactSizeIterator for RegressionLine {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_uses_exact_formula() {
        for m in Material::ALL {
            let p = m.profile();
            for h in [0.0, 12.5, 20.0, 40.0, 59.9, 60.0, 77.0, 100.0] {
                let r = predict(m, h);
                assert_eq!(r.predicted_value, p.slope * h + p.intercept);
            }
        }
    }

    #[test]
    fn validated_range_boundaries_are_inclusive() {
        assert!(is_within_valid_range(20.0));
        assert!(is_within_valid_range(60.0));
        assert!(!is_within_valid_range(19.999));
        assert!(!is_within_valid_range(60.001));
        assert!(!is_within_valid_range(0.0));
        assert!(!is_within_valid_range(100.0));
    }

    #[test]
    fn request_evaluate_matches_predict() {
        let req = PredictionRequest::new(Material::SodiumAlginate, 33.0);
        assert_eq!(req.evaluate(), predict(Material::SodiumAlginate, 33.0));
    }

    #[test]
    fn predict_by_name_rejects_unknown() {
        assert!(predict_by_name("없는 난연제", 40.0).is_err());
        let ok = predict_by_name("난연제 무처리", 40.0).unwrap();
        assert!(ok.within_valid_range);
    }

    #[test]
    fn regression_line_endpoints_and_count() {
        let pts: Vec<_> = regression_line(Material::Untreated, 0.0, 100.0, 200).collect();
        assert_eq!(pts.len(), 200);
        assert_eq!(pts[0].0, 0.0);
        assert_eq!(pts[199].0, 100.0);
        assert!(pts.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn regression_line_small_counts() {
        assert_eq!(regression_line(Material::Untreated, 20.0, 60.0, 0).count(), 0);
        let one: Vec<_> = regression_line(Material::Untreated, 20.0, 60.0, 1).collect();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].0, 20.0);
        let two: Vec<_> = regression_line(Material::Untreated, 20.0, 60.0, 2).collect();
        assert_eq!(two.iter().map(|p| p.0).collect::<Vec<_>>(), vec![20.0, 60.0]);
    }

    #[test]
    fn regression_line_is_restartable_and_exact_size() {
        let line = validated_line(Material::PolyvinylAlcohol, 50);
        assert_eq!(line.len(), 50);
        let first: Vec<_> = line.clone().collect();
        let second: Vec<_> = line.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn regression_line_reverses() {
        let fwd: Vec<_> = full_domain_line(Material::SodiumAlginate, 11).collect();
        let mut rev: Vec<_> = full_domain_line(Material::SodiumAlginate, 11).rev().collect();
        rev.reverse();
        assert_eq!(fwd, rev);
    }
}
