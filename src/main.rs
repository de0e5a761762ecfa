use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use eframe::egui;
use glam::DVec2;

use zoomtree::cli::GuiArgs;
use zoomtree::egui_backend::{install_font, transform_for, EguiMetrics, EguiSurface, FontMapper, Palette};
use zoomtree::geometry::{Point, Screen};
use zoomtree::{logging, Session};

/// Repaint interval while fetches or walks are outstanding.
const BUSY_REPAINT: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    let args = GuiArgs::parse();
    let config = args.common.load_config().context("Failed to load config")?;
    let _log_guard = logging::init(&config.logging);

    let font_bytes = match &args.common.font {
        Some(path) => Some(std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?),
        None => None,
    };
    let session =
        Session::open(&args.common.root, &config).with_context(|| format!("Failed to open {}", args.common.root))?;
    let family = config.render.font_family.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 1030.0])
            .with_title(format!("zoomtree - {}", args.common.root)),
        ..Default::default()
    };

    eframe::run_native(
        "zoomtree",
        options,
        Box::new(move |cc| {
            configure_custom_style(&cc.egui_ctx);
            let fonts = match font_bytes {
                Some(bytes) => install_font(&cc.egui_ctx, &family, bytes),
                None => FontMapper::default(),
            };
            Box::new(ZoomtreeApp::new(&cc.egui_ctx, session, fonts))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Window error: {}", e))
}

fn configure_custom_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = egui::Color32::from_rgba_unmultiplied(30, 41, 59, 240);
    visuals.widgets.noninteractive.bg_stroke =
        egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 13));
    visuals.window_shadow = egui::epaint::Shadow::NONE;

    style.visuals = visuals;
    style.spacing.item_spacing = egui::vec2(12.0, 6.0);
    ctx.set_style(style);
}

struct ZoomtreeApp {
    session: Session,
    fonts: FontMapper,
    palette: Palette,
}

impl ZoomtreeApp {
    fn new(ctx: &egui::Context, mut session: Session, fonts: FontMapper) -> Self {
        session
            .engine_mut()
            .set_metrics(Box::new(EguiMetrics::new(ctx.clone(), fonts.clone())));
        Self {
            session,
            fonts,
            palette: Palette::default(),
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let reset = ctx.input(|i| i.key_pressed(egui::Key::Home) || i.key_pressed(egui::Key::R));
        if reset {
            self.session.engine_mut().reset_view();
        }
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response, rect: egui::Rect) {
        let transform = transform_for(rect);
        let engine = self.session.engine_mut();

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            engine.pan(transform.delta_screen_to_canvas(DVec2::new(delta.x as f64, delta.y as f64)));
        }

        if let Some(pos) = response.hover_pos() {
            // egui reports wheel-up as positive; the engine zooms in on negative deltas
            let scroll_y = ui.input(|i| i.raw_scroll_delta.y);
            if scroll_y != 0.0 {
                let pointer = transform.point_screen_to_canvas(Point::<Screen>::new(pos.x as f64, pos.y as f64));
                engine.zoom_at(pointer, -scroll_y as f64);
            }
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        let engine = self.session.engine();
        let stats = engine.cache().stats();

        ui.horizontal(|ui| {
            ui.label(engine.root());
            ui.separator();
            ui.label(format!("zoom {:.2}x", engine.viewport().zoom));
            ui.separator();
            match engine.active_job() {
                Some(job) => ui.label(format!("rendering #{}", job.id)),
                None => ui.label(format!("frame #{}", engine.presented_job().unwrap_or(0))),
            };
            ui.separator();
            ui.label(format!(
                "entries {} · listings {} · previews {}",
                stats.entries.resolved, stats.listings.resolved, stats.previews.resolved
            ));
            if stats.pending() > 0 {
                ui.spinner();
                ui.label(format!("{} loading", stats.pending()));
            }
            let failed = stats.entries.failed + stats.listings.failed + stats.previews.failed;
            if failed > 0 {
                ui.colored_label(self.palette.error, format!("{} failed", failed));
            }
        });
    }
}

impl eframe::App for ZoomtreeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.palette.background))
            .show(ctx, |ui| {
                let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());

                self.session
                    .engine_mut()
                    .resize(rect.width() as f64, rect.height() as f64);
                self.handle_pointer(ui, &response, rect);
                self.session.pump();

                let painter = ui.painter_at(rect);
                let mut surface = EguiSurface::new(&painter, transform_for(rect), &self.fonts, self.palette);
                self.session.engine().scene().replay(&mut surface);
            });

        if !self.session.is_idle() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }
}
