//! Painting scenes and measuring glyphs with egui.
//!
//! Canvas coordinates are egui points relative to the map area's top-left
//! corner.

use std::sync::Arc;

use eframe::egui;
use glam::DVec2;

use crate::geometry::{BoundingBox, Canvas, Point};
use crate::measure::{FontSpec, GlyphMetrics};
use crate::surface::{Surface, Tone};
use crate::viewport::ScreenTransform;

/// Maps font families onto egui families.
///
/// A family registered from a font file is used by name; everything else
/// falls back to egui's built-in monospace font.
#[derive(Debug, Clone, Default)]
pub struct FontMapper {
    custom: Option<Arc<str>>,
}

impl FontMapper {
    pub fn new(custom: Option<Arc<str>>) -> Self {
        Self { custom }
    }

    pub fn font_id(&self, font: &FontSpec) -> egui::FontId {
        let family = match &self.custom {
            Some(name) if *name == font.family => egui::FontFamily::Name(name.clone()),
            _ => egui::FontFamily::Monospace,
        };
        egui::FontId::new(font.size as f32, family)
    }
}

/// Register a font file with egui under `family`.
pub fn install_font(ctx: &egui::Context, family: &str, bytes: Vec<u8>) -> FontMapper {
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(family.to_string(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .insert(egui::FontFamily::Name(family.into()), vec![family.to_string()]);
    ctx.set_fonts(fonts);
    FontMapper::new(Some(Arc::from(family)))
}

/// Glyph advances from egui's loaded fonts.
pub struct EguiMetrics {
    ctx: egui::Context,
    fonts: FontMapper,
}

impl EguiMetrics {
    pub fn new(ctx: egui::Context, fonts: FontMapper) -> Self {
        Self { ctx, fonts }
    }
}

impl GlyphMetrics for EguiMetrics {
    fn advance(&self, ch: char, font: &FontSpec) -> f64 {
        let font_id = self.fonts.font_id(font);
        self.ctx.fonts(|fonts| fonts.glyph_width(&font_id, ch)) as f64
    }
}

/// Colors per tone.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: egui::Color32,
    pub outline: egui::Color32,
    pub label: egui::Color32,
    pub muted: egui::Color32,
    pub preview: egui::Color32,
    pub error: egui::Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: egui::Color32::from_rgb(15, 23, 42),
            outline: egui::Color32::from_rgba_unmultiplied(255, 255, 255, 40),
            label: egui::Color32::from_rgb(226, 232, 240),
            muted: egui::Color32::from_rgba_unmultiplied(148, 163, 184, 70),
            preview: egui::Color32::from_rgb(125, 211, 252),
            error: egui::Color32::from_rgb(248, 113, 113),
        }
    }
}

impl Palette {
    pub fn color(&self, tone: Tone) -> egui::Color32 {
        match tone {
            Tone::Outline => self.outline,
            Tone::Label => self.label,
            Tone::Muted => self.muted,
            Tone::Preview => self.preview,
            Tone::Error => self.error,
        }
    }
}

/// [`Surface`] drawing through an egui painter.
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    transform: ScreenTransform,
    fonts: &'a FontMapper,
    palette: Palette,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a egui::Painter, transform: ScreenTransform, fonts: &'a FontMapper, palette: Palette) -> Self {
        Self {
            painter,
            transform,
            fonts,
            palette,
        }
    }

    fn pos(&self, p: Point<Canvas>) -> egui::Pos2 {
        let screen = self.transform.point_canvas_to_screen(p);
        egui::pos2(screen.x as f32, screen.y as f32)
    }

    fn rect(&self, b: BoundingBox<Canvas>) -> egui::Rect {
        let min = self.pos(b.top_left());
        let max = self.pos(Point::new(b.right(), b.bottom()));
        egui::Rect::from_min_max(min, max)
    }
}

impl Surface for EguiSurface<'_> {
    fn clear(&mut self, area: BoundingBox<Canvas>) {
        self.painter.rect_filled(self.rect(area), 0.0, self.palette.background);
    }

    fn stroke_rect(&mut self, rect: BoundingBox<Canvas>, tone: Tone) {
        self.painter
            .rect_stroke(self.rect(rect), 0.0, egui::Stroke::new(1.0, self.palette.color(tone)));
    }

    fn fill_text(&mut self, text: &str, at: Point<Canvas>, font: &FontSpec, tone: Tone) {
        self.painter.text(
            self.pos(at),
            egui::Align2::LEFT_TOP,
            text,
            self.fonts.font_id(font),
            self.palette.color(tone),
        );
    }
}

/// Screen transform for a map drawn in `rect`.
pub fn transform_for(rect: egui::Rect) -> ScreenTransform {
    ScreenTransform::new(DVec2::new(rect.min.x as f64, rect.min.y as f64), 1.0)
}
