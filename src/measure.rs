use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Font family, weight and integer pixel size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontSpec {
    pub family: Arc<str>,
    pub weight: FontWeight,
    pub size: u32,
}

impl FontSpec {
    pub fn new(family: impl Into<Arc<str>>, weight: FontWeight, size: u32) -> Self {
        Self {
            family: family.into(),
            weight,
            size,
        }
    }

    pub fn with_size(&self, size: u32) -> Self {
        Self {
            family: self.family.clone(),
            weight: self.weight,
            size,
        }
    }
}

/// Source of per-character advance widths.
pub trait GlyphMetrics {
    fn advance(&self, ch: char, font: &FontSpec) -> f64;
}

/// Every glyph advances by a fixed fraction of the font size.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub advance_ratio: f64,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn advance(&self, ch: char, font: &FontSpec) -> f64 {
        if ch.is_control() {
            return 0.0;
        }
        font.size as f64 * self.advance_ratio
    }
}

/// Metrics read from a TrueType/OpenType file.
///
/// One face serves every family and weight.
pub struct FontdueMetrics {
    font: fontdue::Font,
}

impl FontdueMetrics {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| Error::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let metrics = Self::from_bytes(&bytes)?;
        tracing::info!("Loaded font metrics from {}", path.display());
        Ok(metrics)
    }
}

impl GlyphMetrics for FontdueMetrics {
    fn advance(&self, ch: char, font: &FontSpec) -> f64 {
        self.font.metrics(ch, font.size as f32).advance_width as f64
    }
}

type GlyphKey = (char, Arc<str>, FontWeight, u32);

/// Measures strings as the sum of memoized per-character advances.
///
/// The fit search re-measures the same strings many times per box, so
/// advances are cached per `(char, family, weight, size)`.
pub struct TextMeasurer {
    metrics: Box<dyn GlyphMetrics>,
    advances: HashMap<GlyphKey, f64>,
    misses: u64,
}

impl TextMeasurer {
    pub fn new(metrics: Box<dyn GlyphMetrics>) -> Self {
        Self {
            metrics,
            advances: HashMap::new(),
            misses: 0,
        }
    }

    /// Swap the metrics backend; cached advances belong to the old one.
    pub fn set_metrics(&mut self, metrics: Box<dyn GlyphMetrics>) {
        self.metrics = metrics;
        self.advances.clear();
    }

    fn advance(&mut self, ch: char, font: &FontSpec) -> f64 {
        let key = (ch, font.family.clone(), font.weight, font.size);
        if let Some(&width) = self.advances.get(&key) {
            return width;
        }
        self.misses += 1;
        let width = self.metrics.advance(ch, font);
        self.advances.insert(key, width);
        width
    }

    pub fn width(&mut self, text: &str, font: &FontSpec) -> f64 {
        text.chars().map(|ch| self.advance(ch, font)).sum()
    }

    /// Width of `words` joined by `separator`, without building the string.
    pub fn joined_width(&mut self, words: &[&str], separator: &str, font: &FontSpec) -> f64 {
        let words_width: f64 = words.iter().map(|w| self.width(w, font)).sum();
        let gaps = words.len().saturating_sub(1) as f64;
        words_width + gaps * self.width(separator, font)
    }

    /// Number of advances measured by the backend so far.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn cached_glyphs(&self) -> usize {
        self.advances.len()
    }
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new(Box::new(MonospaceMetrics::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingMetrics {
        calls: Rc<Cell<u64>>,
    }

    impl GlyphMetrics for CountingMetrics {
        fn advance(&self, _ch: char, font: &FontSpec) -> f64 {
            self.calls.set(self.calls.get() + 1);
            font.size as f64 * 0.5
        }
    }

    #[test]
    fn test_advances_are_memoized() {
        let calls = Rc::new(Cell::new(0));
        let mut measurer = TextMeasurer::new(Box::new(CountingMetrics {
            calls: calls.clone(),
        }));
        let font = FontSpec::new("Monaco", FontWeight::Normal, 10);

        assert_eq!(measurer.width("aaaa", &font), 20.0);
        assert_eq!(calls.get(), 1);

        measurer.width("abab", &font);
        assert_eq!(calls.get(), 2);

        // A different size is a different key
        measurer.width("a", &font.with_size(12));
        assert_eq!(calls.get(), 3);
        assert_eq!(measurer.misses(), 3);
        assert_eq!(measurer.cached_glyphs(), 3);
    }

    #[test]
    fn test_joined_width_matches_joined_string() {
        let mut measurer = TextMeasurer::default();
        let font = FontSpec::new("Monaco", FontWeight::Normal, 10);
        let words = ["hello", "big", "world"];

        let joined = measurer.width(&words.join(" "), &font);
        assert!((measurer.joined_width(&words, " ", &font) - joined).abs() < 1e-9);
        assert_eq!(measurer.joined_width(&[], " ", &font), 0.0);
    }

    #[test]
    fn test_fontdue_rejects_garbage() {
        assert!(FontdueMetrics::from_bytes(b"not a font").is_err());
    }
}
