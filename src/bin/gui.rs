#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use char_length_predictor::{
    app,
    chart::{ChartSpec, LegendEntry, Rgb},
    config, i18n,
    i18n::keys,
    material::Material,
    prediction::PredictionRequest,
    report::Report,
};
use eframe::{egui, App, Frame};
use image::GenericImageView;
use rfd::FileDialog;
use std::{env, fs, path::Path, path::PathBuf};

fn main() -> Result<(), eframe::Error> {
    // CLI 언어 옵션 처리: --lang xx 또는 --lang=xx (xx: auto/ko/en-us)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let mut app_cfg = config::load_or_default().unwrap_or_else(|e| {
        eprintln!("Config error: {e}");
        config::Config::default()
    });
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&app_cfg.log_level),
    )
    .init();
    if let Some(lang_cli) = cli_lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(760.0, 860.0))
        .with_transparent(true);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "Char Length Predictor",
        options,
        Box::new(move |cc| {
            let mut gui = GuiApp::new(app_cfg.clone());
            if let Err(e) = setup_fonts(&cc.egui_ctx, app_cfg.font_path.as_deref()) {
                log::warn!("{e}");
                gui.font_status = Some(gui.tr.t(keys::GUI_FONT_MISSING));
            }
            Box::new(gui)
        }),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["icon.png", "assets/icon.png", "../icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: rgba.into_raw(),
        width: w,
        height: h,
    })
}

/// 공통: 바이너리 폰트 바이트를 egui에 등록.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .insert(0, font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .insert(0, font_name);
    ctx.set_fonts(fonts);
}

/// 운영체제별 한글 폰트 후보 경로.
fn korean_font_candidates() -> Vec<PathBuf> {
    let mut out = vec![
        PathBuf::from("assets/fonts/NanumGothic.ttf"),
        PathBuf::from("assets/fonts/malgun.ttf"),
    ];
    if let Some(windir) = env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        for cand in ["malgun.ttf", "gulim.ttc", "batang.ttc"] {
            out.push(fonts.join(cand));
        }
    }
    if cfg!(target_os = "macos") {
        out.push("/System/Library/Fonts/Supplemental/AppleGothic.ttf".into());
        out.push("/Library/Fonts/AppleGothic.ttf".into());
        out.push("/System/Library/Fonts/AppleSDGothicNeo.ttc".into());
    }
    out.push("/usr/share/fonts/truetype/nanum/NanumGothic.ttf".into());
    out.push("/usr/share/fonts/nanum/NanumGothic.ttf".into());
    if let Some(home) = env::var_os("HOME") {
        out.push(Path::new(&home).join(".local/share/fonts/NanumGothic.ttf"));
    }
    out
}

/// 한글을 표시하기 위해 사용자 폰트 → 프로젝트 폰트 → 시스템 폰트 순으로 적용한다.
fn setup_fonts(ctx: &egui::Context, user_font: Option<&str>) -> Result<(), String> {
    if let Some(path) = user_font {
        match load_custom_font(ctx, path) {
            Ok(()) => return Ok(()),
            Err(e) => log::warn!("{e}"),
        }
    }
    for p in korean_font_candidates() {
        if p.exists() {
            let bytes = fs::read(&p)
                .map_err(|e| format!("Failed to read system font ({}): {e}", p.display()))?;
            apply_font_bytes(ctx, bytes, "korean_font");
            log::debug!("using font {}", p.display());
            return Ok(());
        }
    }
    Err("Font not found. Please set a user font (.ttf/.ttc) in settings.".into())
}

/// 사용자가 선택한 경로의 폰트를 egui에 등록한다.
fn load_custom_font(ctx: &egui::Context, path: &str) -> Result<(), String> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("Font file not found: {path}"));
    }
    let bytes = fs::read(p).map_err(|e| format!("Failed to read font file: {e}"))?;
    apply_font_bytes(ctx, bytes, "user_font");
    Ok(())
}

fn color32(c: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(c.0, c.1, c.2)
}

/// `ChartSpec`을 egui 페인터로 그린다.
fn paint_chart(ui: &mut egui::Ui, spec: &ChartSpec) {
    let width = ui.available_width().max(320.0);
    let height = width * 5.0 / 7.0;
    let (response, painter) = ui.allocate_painter(egui::vec2(width, height), egui::Sense::hover());
    let outer = response.rect;
    let text_color = ui.visuals().text_color();
    let small = egui::FontId::proportional(11.0);

    painter.rect_filled(outer, 4.0, egui::Color32::WHITE);
    let plot = egui::Rect::from_min_max(
        outer.min + egui::vec2(48.0, 36.0),
        outer.max - egui::vec2(16.0, 40.0),
    );
    let to_screen = |x: f64, y: f64| {
        egui::pos2(
            plot.left() + spec.x_axis.fraction(x) as f32 * plot.width(),
            plot.bottom() - spec.y_axis.fraction(y) as f32 * plot.height(),
        )
    };

    painter.text(
        egui::pos2(outer.center().x, outer.top() + 8.0),
        egui::Align2::CENTER_TOP,
        &spec.title,
        egui::FontId::proportional(14.0),
        egui::Color32::BLACK,
    );

    // 격자 + 눈금
    let grid_stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(230));
    for i in 0..=10 {
        let x = spec.x_axis.min + (spec.x_axis.max - spec.x_axis.min) * i as f64 / 10.0;
        let p = to_screen(x, spec.y_axis.min);
        if spec.grid {
            painter.line_segment([egui::pos2(p.x, plot.top()), p], grid_stroke);
        }
        painter.text(
            p + egui::vec2(0.0, 4.0),
            egui::Align2::CENTER_TOP,
            format!("{x:.0}"),
            small.clone(),
            egui::Color32::BLACK,
        );
    }
    let y_steps = (spec.y_axis.max - spec.y_axis.min).round().max(1.0) as usize;
    for i in 0..=y_steps {
        let y = spec.y_axis.min + (spec.y_axis.max - spec.y_axis.min) * i as f64 / y_steps as f64;
        let p = to_screen(spec.x_axis.min, y);
        if spec.grid {
            painter.line_segment([p, egui::pos2(plot.right(), p.y)], grid_stroke);
        }
        painter.text(
            p - egui::vec2(4.0, 0.0),
            egui::Align2::RIGHT_CENTER,
            format!("{y:.0}"),
            small.clone(),
            egui::Color32::BLACK,
        );
    }
    painter.rect_stroke(plot, 0.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
    painter.text(
        egui::pos2(plot.center().x, outer.bottom() - 4.0),
        egui::Align2::CENTER_BOTTOM,
        &spec.x_axis.label,
        egui::FontId::proportional(12.0),
        egui::Color32::BLACK,
    );
    painter.text(
        egui::pos2(outer.left() + 4.0, plot.top() - 4.0),
        egui::Align2::LEFT_BOTTOM,
        &spec.y_axis.label,
        egui::FontId::proportional(12.0),
        egui::Color32::BLACK,
    );

    let clipped = painter.with_clip_rect(plot);
    for line in &spec.lines {
        let pts: Vec<egui::Pos2> = line.points.iter().map(|&(x, y)| to_screen(x, y)).collect();
        let stroke = egui::Stroke::new(1.6, color32(line.color));
        if line.dashed {
            clipped.extend(egui::Shape::dashed_line(&pts, stroke, 6.0, 4.0));
        } else {
            clipped.add(egui::Shape::line(pts, stroke));
        }
    }
    clipped.circle_filled(to_screen(spec.point.x, spec.point.y), 5.0, color32(spec.point.color));

    // 범례
    let entries = spec.legend_entries();
    let label_width = entries
        .iter()
        .map(|e| {
            let label = match e {
                LegendEntry::Line { label, .. } | LegendEntry::Point { label, .. } => *label,
            };
            painter
                .layout_no_wrap(label.to_string(), small.clone(), text_color)
                .size()
                .x
        })
        .fold(0.0_f32, f32::max);
    let row_h = 16.0;
    let legend = egui::Rect::from_min_size(
        egui::pos2(plot.right() - label_width - 44.0, plot.top() + 6.0),
        egui::vec2(label_width + 38.0, row_h * entries.len() as f32 + 6.0),
    );
    painter.rect_filled(legend, 3.0, egui::Color32::from_white_alpha(230));
    painter.rect_stroke(legend, 3.0, egui::Stroke::new(1.0, egui::Color32::from_gray(200)));
    for (i, entry) in entries.iter().enumerate() {
        let y = legend.top() + 3.0 + row_h * (i as f32 + 0.5);
        let x = legend.left() + 6.0;
        let label = match entry {
            LegendEntry::Line { label, color } => {
                painter.extend(egui::Shape::dashed_line(
                    &[egui::pos2(x, y), egui::pos2(x + 22.0, y)],
                    egui::Stroke::new(1.6, color32(*color)),
                    5.0,
                    3.0,
                ));
                *label
            }
            LegendEntry::Point { label, color } => {
                painter.circle_filled(egui::pos2(x + 11.0, y), 4.0, color32(*color));
                *label
            }
        };
        painter.text(
            egui::pos2(x + 28.0, y),
            egui::Align2::LEFT_CENTER,
            label,
            small.clone(),
            egui::Color32::BLACK,
        );
    }
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    material: Material,
    humidity: f64,
    lang_input: String,
    font_input: String,
    window_alpha: f32,
    show_settings_modal: bool,
    show_help_modal: bool,
    status: Option<String>,
    font_status: Option<String>,
    settings_status: Option<String>,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = i18n::Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        let material = config.material().unwrap_or_else(|e| {
            log::warn!("{e}; falling back to {}", Material::Untreated.name());
            Material::Untreated
        });
        Self {
            tr,
            material,
            humidity: config.humidity(),
            lang_input: config.language.clone(),
            font_input: config.font_path.clone().unwrap_or_default(),
            window_alpha: config.window_alpha,
            show_settings_modal: false,
            show_help_modal: false,
            status: None,
            font_status: None,
            settings_status: None,
            config,
        }
    }

    fn request(&self) -> PredictionRequest {
        PredictionRequest::new(self.material, self.humidity)
    }

    fn material_label(&self, m: Material) -> String {
        self.tr.t(&format!("material.{}", m.key()))
    }

    fn chart_spec(&self) -> ChartSpec {
        ChartSpec::build(self.request(), self.config.sample_count, &self.tr)
    }

    fn save_chart_to(&mut self, path: &Path) {
        self.status = Some(match app::save_chart(&self.config, &self.tr, self.request(), path) {
            Ok(()) => self
                .tr
                .tf(keys::CHART_SAVED, &[("path", path.display().to_string())]),
            Err(e) => {
                log::error!("{e}");
                self.tr.tf(keys::GUI_CHART_ERROR, &[("error", e.to_string())])
            }
        });
    }

    fn ui_inputs(&mut self, ui: &mut egui::Ui) {
        ui.label(self.tr.t(keys::GUI_MATERIAL_LABEL));
        let labels: Vec<(Material, String)> = Material::ALL
            .into_iter()
            .map(|m| (m, self.material_label(m)))
            .collect();
        let selected = self.material_label(self.material);
        let material = &mut self.material;
        egui::ComboBox::from_id_source("material_choice")
            .selected_text(selected)
            .width(ui.available_width().min(360.0))
            .show_ui(ui, |ui| {
                for (m, label) in labels {
                    ui.selectable_value(material, m, label);
                }
            });
        ui.add_space(6.0);
        ui.label(self.tr.t(keys::GUI_HUMIDITY_LABEL));
        ui.add(
            egui::Slider::new(&mut self.humidity, 0.0..=100.0)
                .step_by(1.0)
                .suffix("%"),
        );
    }

    fn ui_result(&mut self, ui: &mut egui::Ui) {
        let report = Report::evaluate(self.request());
        let text = report.render(&self.tr);
        let mut lines = text.lines();
        if let Some(heading) = lines.next() {
            ui.heading(heading.trim_start_matches('#').trim());
        }
        for line in lines {
            ui.label(line);
        }
        if let Some(warning) = report.warning(&self.tr) {
            ui.colored_label(ui.visuals().warn_fg_color, warning);
        }
    }

    fn ui_settings(&mut self, ctx: &egui::Context) {
        let tr = self.tr.clone();
        let mut open = self.show_settings_modal;
        egui::Window::new(tr.t(keys::GUI_SETTINGS_BUTTON))
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(tr.t(keys::GUI_SETTINGS_LANG));
                egui::ComboBox::from_id_source("lang_choice")
                    .selected_text(&self.lang_input)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.lang_input,
                            "auto".into(),
                            tr.t(keys::GUI_SETTINGS_LANG_AUTO),
                        );
                        ui.selectable_value(&mut self.lang_input, "ko".into(), "한국어");
                        ui.selectable_value(&mut self.lang_input, "en-us".into(), "English (US)");
                    });
                ui.separator();
                ui.label(tr.t(keys::GUI_SETTINGS_ALPHA));
                ui.add(egui::Slider::new(&mut self.window_alpha, 0.3..=1.0).text("alpha"));
                ui.separator();
                ui.label(tr.t(keys::GUI_SETTINGS_FONT));
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.font_input);
                    if ui.button(tr.t(keys::GUI_SETTINGS_FONT_BROWSE)).clicked() {
                        if let Some(p) = FileDialog::new()
                            .add_filter("Font", &["ttf", "ttc", "otf"])
                            .pick_file()
                        {
                            self.font_input = p.display().to_string();
                        }
                    }
                });
                ui.separator();
                if ui.button(tr.t(keys::GUI_SETTINGS_SAVE)).clicked() {
                    self.apply_settings(ctx);
                }
                if let Some(msg) = &self.settings_status {
                    ui.label(msg);
                }
            });
        self.show_settings_modal = open;
    }

    fn apply_settings(&mut self, ctx: &egui::Context) {
        self.config.language = self.lang_input.clone();
        self.config.window_alpha = self.window_alpha;
        let font = self.font_input.trim();
        self.config.font_path = (!font.is_empty()).then(|| font.to_string());
        if let Some(path) = self.config.font_path.clone() {
            match load_custom_font(ctx, &path) {
                Ok(()) => self.font_status = None,
                Err(e) => self.font_status = Some(e),
            }
        }
        // 즉시 번역기 반영
        let resolved = i18n::resolve_language(&self.config.language, None);
        self.tr = i18n::Translator::new_with_pack(&resolved, self.config.language_pack_dir.as_deref());
        self.persist_selection();
        self.settings_status = Some(match self.config.save() {
            Ok(()) => self.tr.t(keys::GUI_SETTINGS_SAVED),
            Err(e) => format!("{}: {e}", self.tr.t(keys::ERROR_PREFIX)),
        });
    }

    fn persist_selection(&mut self) {
        self.config.default_material = self.material.name().to_string();
        self.config.default_humidity = self.humidity;
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 투명도 적용
        let mut style = (*ctx.style()).clone();
        style.visuals.window_fill = style.visuals.window_fill.linear_multiply(self.window_alpha);
        style.visuals.panel_fill = style.visuals.panel_fill.linear_multiply(self.window_alpha);
        ctx.set_style(style);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(self.tr.t(keys::APP_TITLE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button(self.tr.t(keys::GUI_ABOUT)).clicked() {
                        self.show_help_modal = true;
                    }
                    if ui.button(self.tr.t(keys::GUI_SETTINGS_BUTTON)).clicked() {
                        self.show_settings_modal = true;
                    }
                });
            });
        });

        if self.show_settings_modal {
            self.ui_settings(ctx);
        }

        if self.show_help_modal {
            let tr = self.tr.clone();
            egui::Window::new(tr.t(keys::GUI_ABOUT))
                .collapsible(false)
                .resizable(true)
                .open(&mut self.show_help_modal)
                .show(ctx, |ui| {
                    ui.heading(tr.t(keys::APP_TITLE));
                    ui.label(tr.t(keys::APP_INTRO));
                    ui.separator();
                    for m in Material::ALL {
                        let p = m.profile();
                        ui.monospace(format!(
                            "{}: y = {:+.2}·x + {:.2}",
                            tr.t(&format!("material.{}", m.key())),
                            p.slope,
                            p.intercept
                        ));
                    }
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.label(self.tr.t(keys::APP_INTRO));
                    if let Some(msg) = &self.font_status {
                        ui.colored_label(ui.visuals().warn_fg_color, msg);
                    }
                    ui.separator();
                    self.ui_inputs(ui);
                    ui.separator();
                    self.ui_result(ui);
                    ui.separator();
                    let spec = self.chart_spec();
                    paint_chart(ui, &spec);
                    ui.horizontal(|ui| {
                        if ui.button(self.tr.t(keys::GUI_SAVE_CHART)).clicked() {
                            if let Some(path) = FileDialog::new()
                                .add_filter("PNG", &["png"])
                                .set_file_name(app::DEFAULT_CHART_PATH)
                                .save_file()
                            {
                                self.save_chart_to(&path);
                            }
                        }
                        if let Some(msg) = &self.status {
                            ui.label(msg);
                        }
                    });
                });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.persist_selection();
        if let Err(e) = self.config.save() {
            log::error!("{e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use char_length_predictor::{chart::point_color, render};

    #[test]
    fn new_app_uses_config_defaults() {
        let app = GuiApp::new(config::Config::default());
        assert_eq!(app.material, Material::Untreated);
        assert_eq!(app.humidity, 40.0);
    }

    #[test]
    fn unknown_config_material_falls_back() {
        let mut cfg = config::Config::default();
        cfg.default_material = "없음".into();
        assert_eq!(GuiApp::new(cfg).material, Material::Untreated);
    }

    #[test]
    fn chart_point_follows_slider() {
        let mut app = GuiApp::new(config::Config::default());
        app.material = Material::SodiumAlginate;
        app.humidity = 100.0;
        let spec = app.chart_spec();
        assert_eq!(spec.point.color, Rgb::GRAY);
        assert!((spec.point.y - 3.71).abs() < 1e-9);
    }

    #[test]
    fn save_chart_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut app = GuiApp::new(config::Config::default());
        app.save_chart_to(&path);
        assert!(path.exists());
        assert!(app.status.unwrap().contains("out.png"));
    }

    #[test]
    fn point_colors_map_to_egui() {
        assert_eq!(color32(point_color(true)), egui::Color32::RED);
        assert_eq!(color32(point_color(false)), egui::Color32::from_rgb(128, 128, 128));
    }

    #[test]
    fn icon_search_does_not_panic_without_files() {
        let _ = load_app_icon();
        assert!(!korean_font_candidates().is_empty());
    }

    #[test]
    fn default_chart_size_matches_renderer() {
        let cfg = config::Config::default();
        assert_eq!(
            (cfg.chart_width, cfg.chart_height),
            (render::DEFAULT_WIDTH, render::DEFAULT_HEIGHT)
        );
    }
}
