use std::collections::BTreeMap;

use serde::Serialize;

use crate::geometry::{BoundingBox, Canvas, Point};
use crate::measure::FontSpec;

/// Role of a drawn element; front ends pick the colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Outline,
    Label,
    /// Label of a directory whose children are drawn over it
    Muted,
    Preview,
    Error,
}

/// Immediate-mode 2D drawing target in canvas coordinates.
pub trait Surface {
    fn clear(&mut self, area: BoundingBox<Canvas>);
    fn stroke_rect(&mut self, rect: BoundingBox<Canvas>, tone: Tone);
    /// Draw `text` with its top-left corner at `at`.
    fn fill_text(&mut self, text: &str, at: Point<Canvas>, font: &FontSpec, tone: Tone);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        area: BoundingBox<Canvas>,
    },
    StrokeRect {
        rect: BoundingBox<Canvas>,
        tone: Tone,
    },
    Text {
        text: String,
        at: Point<Canvas>,
        font: FontSpec,
        tone: Tone,
    },
}

/// Recorded display list; one per render walk.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Draw every recorded command onto `surface` in order.
    pub fn replay(&self, surface: &mut dyn Surface) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear { area } => surface.clear(*area),
                DrawCommand::StrokeRect { rect, tone } => surface.stroke_rect(*rect, *tone),
                DrawCommand::Text { text, at, font, tone } => surface.fill_text(text, *at, font, *tone),
            }
        }
    }

    /// Text commands of the given tone, in draw order.
    pub fn texts(&self, tone: Tone) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(move |command| match command {
            DrawCommand::Text { text, tone: t, .. } if *t == tone => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn tone_counts(&self) -> BTreeMap<Tone, usize> {
        let mut counts = BTreeMap::new();
        for command in &self.commands {
            let tone = match command {
                DrawCommand::Clear { .. } => continue,
                DrawCommand::StrokeRect { tone, .. } | DrawCommand::Text { tone, .. } => *tone,
            };
            *counts.entry(tone).or_insert(0) += 1;
        }
        counts
    }
}

impl Surface for Scene {
    fn clear(&mut self, area: BoundingBox<Canvas>) {
        self.commands.push(DrawCommand::Clear { area });
    }

    fn stroke_rect(&mut self, rect: BoundingBox<Canvas>, tone: Tone) {
        self.commands.push(DrawCommand::StrokeRect { rect, tone });
    }

    fn fill_text(&mut self, text: &str, at: Point<Canvas>, font: &FontSpec, tone: Tone) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            at,
            font: font.clone(),
            tone,
        });
    }
}
