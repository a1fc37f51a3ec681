use crate::i18n::{keys, Translator};
use crate::prediction::{PredictionRequest, PredictionResult};

/// 예측 결과를 사람이 읽는 텍스트로 정리한다.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub request: PredictionRequest,
    pub result: PredictionResult,
}

impl Report {
    pub fn new(request: PredictionRequest, result: PredictionResult) -> Self {
        Self { request, result }
    }

    /// 요청을 평가해 보고서를 만든다.
    pub fn evaluate(request: PredictionRequest) -> Self {
        Self::new(request, request.evaluate())
    }

    pub fn material_label(&self, tr: &Translator) -> String {
        tr.t(&format!("material.{}", self.request.material.key()))
    }

    /// 제목과 세 줄(난연제, 습도, 예상 탄화 길이)로 된 보고서.
    pub fn render(&self, tr: &Translator) -> String {
        [
            tr.t(keys::REPORT_HEADING),
            tr.tf(keys::REPORT_MATERIAL, &[("material", self.material_label(tr))]),
            tr.tf(
                keys::REPORT_HUMIDITY,
                &[("humidity", format_humidity(self.request.humidity))],
            ),
            tr.tf(
                keys::REPORT_PREDICTED,
                &[("predicted", format!("{:.2}", self.result.predicted_value))],
            ),
        ]
        .join("\n")
    }

    /// 습도가 실험 영역 밖이면 경고 문구.
    pub fn warning(&self, tr: &Translator) -> Option<String> {
        (!self.result.within_valid_range).then(|| tr.t(keys::REPORT_WARNING))
    }
}

/// 정수 습도는 소수점 없이, 그 외에는 그대로 표시한다.
pub fn format_humidity(humidity: f64) -> String {
    format!("{humidity}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;

    #[test]
    fn korean_report_lines() {
        let tr = Translator::new("ko");
        let r = Report::evaluate(PredictionRequest::new(Material::Untreated, 40.0));
        let text = r.render(&tr);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "- 선택한 난연제 종류: 난연제 무처리");
        assert_eq!(lines[2], "- 습도: 40%");
        assert_eq!(lines[3], "- 예상 탄화 길이: 6.18 cm");
        assert!(r.warning(&tr).is_none());
    }

    #[test]
    fn warning_outside_validated_range() {
        let tr = Translator::new("ko");
        let r = Report::evaluate(PredictionRequest::new(Material::PolyvinylAlcohol, 0.0));
        assert!(r.render(&tr).contains("2.67 cm"));
        let w = r.warning(&tr).unwrap();
        assert!(w.contains("20~60%"));
    }

    #[test]
    fn fractional_humidity_is_kept() {
        assert_eq!(format_humidity(42.5), "42.5");
        assert_eq!(format_humidity(100.0), "100");
    }
}
