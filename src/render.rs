//! `ChartSpec`을 PNG 래스터 이미지로 그린다.
//!
//! 글꼴 래스터라이저가 없으므로 글자는 그리지 않는다. 격자, 축, 눈금, 점선 회귀선,
//! 예측점, 범례 색 견본만 그리며 글자 정보는 텍스트 보고서가 담당한다.

use std::path::Path;

use image::{ImageFormat, Rgb as Pixel, RgbImage};

use crate::chart::{ChartSpec, LegendEntry, Rgb};

/// matplotlib `figsize=(7, 5)`, 100 dpi 기준.
pub const DEFAULT_WIDTH: u32 = 700;
pub const DEFAULT_HEIGHT: u32 = 500;

/// 한 장에 허용하는 최대 픽셀 수(8192x8192).
pub const MAX_PIXELS: u64 = 8192 * 8192;

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 40;
const MARGIN_BOTTOM: u32 = 50;
const DASH_ON: f64 = 6.0;
const DASH_PERIOD: f64 = 10.0;
const POINT_RADIUS: i64 = 5;
const GRID_COLOR: Rgb = Rgb(235, 235, 235);

/// PNG 저장 시 발생 가능한 오류.
#[derive(Debug)]
pub enum RenderError {
    /// 이미지 인코딩/파일 쓰기 오류
    Image(image::ImageError),
    /// 그릴 영역이 여백보다 작음
    TooSmall { width: u32, height: u32 },
    /// 픽셀 수가 `MAX_PIXELS`를 넘음
    TooLarge { width: u32, height: u32 },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Image(e) => write!(f, "이미지 저장 오류: {e}"),
            RenderError::TooSmall { width, height } => {
                write!(f, "이미지 크기가 너무 작습니다: {width}x{height}")
            }
            RenderError::TooLarge { width, height } => {
                write!(f, "이미지 크기가 너무 큽니다: {width}x{height}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<image::ImageError> for RenderError {
    fn from(value: image::ImageError) -> Self {
        RenderError::Image(value)
    }
}

/// 데이터 좌표 → 픽셀 좌표 변환과 플롯 영역.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PlotArea {
    fn new(width: u32, height: u32) -> Self {
        Self {
            left: MARGIN_LEFT as f64,
            top: MARGIN_TOP as f64,
            right: (width - MARGIN_RIGHT) as f64,
            bottom: (height - MARGIN_BOTTOM) as f64,
        }
    }

    fn to_pixel(&self, spec: &ChartSpec, x: f64, y: f64) -> (f64, f64) {
        let px = self.left + spec.x_axis.fraction(x) * (self.right - self.left);
        let py = self.bottom - spec.y_axis.fraction(y) * (self.bottom - self.top);
        (px, py)
    }

    fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.left && px <= self.right && py >= self.top && py <= self.bottom
    }
}

/// 그래프를 `width`×`height` 이미지로 그린다.
pub fn render(spec: &ChartSpec, width: u32, height: u32) -> Result<RgbImage, RenderError> {
    if width <= MARGIN_LEFT + MARGIN_RIGHT + 10 || height <= MARGIN_TOP + MARGIN_BOTTOM + 10 {
        return Err(RenderError::TooSmall { width, height });
    }
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(RenderError::TooLarge { width, height });
    }
    let mut img = RgbImage::from_pixel(width, height, pixel(Rgb::WHITE));
    let area = PlotArea::new(width, height);

    if spec.grid {
        draw_grid(&mut img, spec, &area);
    }
    draw_axes(&mut img, spec, &area);

    for line in &spec.lines {
        let pts: Vec<(f64, f64)> = line
            .points
            .iter()
            .map(|&(x, y)| area.to_pixel(spec, x, y))
            .collect();
        draw_polyline(&mut img, &area, &pts, line.color, line.dashed);
    }

    let (px, py) = area.to_pixel(spec, spec.point.x, spec.point.y);
    if area.contains(px, py) {
        fill_circle(&mut img, px, py, POINT_RADIUS, spec.point.color);
    }

    draw_legend(&mut img, spec, &area);
    Ok(img)
}

/// 그래프를 PNG 파일로 저장한다.
pub fn save_png(
    spec: &ChartSpec,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<(), RenderError> {
    let img = render(spec, width, height)?;
    img.save_with_format(path.as_ref(), ImageFormat::Png)?;
    log::info!("chart written to {}", path.as_ref().display());
    Ok(())
}

fn pixel(c: Rgb) -> Pixel<u8> {
    Pixel([c.0, c.1, c.2])
}

fn put(img: &mut RgbImage, x: i64, y: i64, c: Rgb) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, pixel(c));
    }
}

fn hline(img: &mut RgbImage, x0: f64, x1: f64, y: f64, c: Rgb) {
    let y = y.round() as i64;
    for x in x0.round() as i64..=x1.round() as i64 {
        put(img, x, y, c);
    }
}

fn vline(img: &mut RgbImage, x: f64, y0: f64, y1: f64, c: Rgb) {
    let x = x.round() as i64;
    for y in y0.round() as i64..=y1.round() as i64 {
        put(img, x, y, c);
    }
}

fn x_ticks(spec: &ChartSpec) -> impl Iterator<Item = f64> + '_ {
    // 10% 간격
    (0..=10).map(move |i| spec.x_axis.min + (spec.x_axis.max - spec.x_axis.min) * i as f64 / 10.0)
}

fn y_ticks(spec: &ChartSpec) -> impl Iterator<Item = f64> + '_ {
    let steps = (spec.y_axis.max - spec.y_axis.min).round().max(1.0) as usize;
    (0..=steps).map(move |i| {
        spec.y_axis.min + (spec.y_axis.max - spec.y_axis.min) * i as f64 / steps as f64
    })
}

fn draw_grid(img: &mut RgbImage, spec: &ChartSpec, area: &PlotArea) {
    for x in x_ticks(spec) {
        let (px, _) = area.to_pixel(spec, x, spec.y_axis.min);
        vline(img, px, area.top, area.bottom, GRID_COLOR);
    }
    for y in y_ticks(spec) {
        let (_, py) = area.to_pixel(spec, spec.x_axis.min, y);
        hline(img, area.left, area.right, py, GRID_COLOR);
    }
}

fn draw_axes(img: &mut RgbImage, spec: &ChartSpec, area: &PlotArea) {
    hline(img, area.left, area.right, area.bottom, Rgb::BLACK);
    hline(img, area.left, area.right, area.top, Rgb::BLACK);
    vline(img, area.left, area.top, area.bottom, Rgb::BLACK);
    vline(img, area.right, area.top, area.bottom, Rgb::BLACK);
    for x in x_ticks(spec) {
        let (px, _) = area.to_pixel(spec, x, spec.y_axis.min);
        vline(img, px, area.bottom, area.bottom + 5.0, Rgb::BLACK);
    }
    for y in y_ticks(spec) {
        let (_, py) = area.to_pixel(spec, spec.x_axis.min, y);
        hline(img, area.left - 5.0, area.left, py, Rgb::BLACK);
    }
}

/// 두께 2px 선. 점선이면 누적 길이 기준으로 켜고 끈다.
fn draw_polyline(img: &mut RgbImage, area: &PlotArea, pts: &[(f64, f64)], c: Rgb, dashed: bool) {
    let mut travelled = 0.0;
    for seg in pts.windows(2) {
        let (x0, y0) = seg[0];
        let (x1, y1) = seg[1];
        let len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        let steps = (len * 2.0).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let along = travelled + t * len;
            if dashed && along % DASH_PERIOD >= DASH_ON {
                continue;
            }
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            if !area.contains(x, y) {
                continue;
            }
            let (xi, yi) = (x.round() as i64, y.round() as i64);
            put(img, xi, yi, c);
            put(img, xi, yi + 1, c);
        }
        travelled += len;
    }
}

fn fill_circle(img: &mut RgbImage, cx: f64, cy: f64, r: i64, c: Rgb) {
    let (cx, cy) = (cx.round() as i64, cy.round() as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put(img, cx + dx, cy + dy, c);
            }
        }
    }
}

/// 플롯 우상단에 범례 색 견본을 세로로 나열한다.
fn draw_legend(img: &mut RgbImage, spec: &ChartSpec, area: &PlotArea) {
    let x0 = area.right - 40.0;
    let mut y = area.top + 12.0;
    for entry in spec.legend_entries() {
        match entry {
            LegendEntry::Line { color, .. } => {
                for dy in 0..2 {
                    hline(img, x0, x0 + 24.0, y + dy as f64, color);
                }
            }
            LegendEntry::Point { color, .. } => {
                fill_circle(img, x0 + 12.0, y, 4, color);
            }
        }
        y += 14.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Translator;
    use crate::material::Material;
    use crate::prediction::PredictionRequest;

    fn spec(humidity: f64) -> ChartSpec {
        ChartSpec::build(
            PredictionRequest::new(Material::Untreated, humidity),
            200,
            &Translator::new("ko"),
        )
    }

    #[test]
    fn renders_requested_size() {
        let img = render(&spec(40.0), DEFAULT_WIDTH, DEFAULT_HEIGHT).unwrap();
        assert_eq!(img.dimensions(), (700, 500));
    }

    #[test]
    fn prediction_point_is_painted() {
        let s = spec(40.0);
        let img = render(&s, DEFAULT_WIDTH, DEFAULT_HEIGHT).unwrap();
        let area = PlotArea::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
        let (px, py) = area.to_pixel(&s, s.point.x, s.point.y);
        let p = img.get_pixel(px.round() as u32, py.round() as u32);
        assert_eq!(*p, pixel(Rgb::RED));
    }

    #[test]
    fn tiny_canvas_is_rejected() {
        assert!(matches!(
            render(&spec(40.0), 50, 50),
            Err(RenderError::TooSmall { .. })
        ));
    }

    #[test]
    fn huge_canvas_is_rejected_before_allocating() {
        assert!(matches!(
            render(&spec(40.0), u32::MAX, u32::MAX),
            Err(RenderError::TooLarge { .. })
        ));
        assert!(matches!(
            render(&spec(40.0), 8193, 8192),
            Err(RenderError::TooLarge { width: 8193, height: 8192 })
        ));
    }

    #[test]
    fn save_png_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        save_png(&spec(80.0), &path, 400, 300).unwrap();
        let back = image::open(&path).unwrap();
        assert_eq!((back.width(), back.height()), (400, 300));
    }
}
