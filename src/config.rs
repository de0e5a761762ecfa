//! Settings loaded from a TOML file.
//!
//! Every field has a default so a config file only needs the keys it
//! changes:
//!
//! ```toml
//! [render]
//! font_family = "Menlo"
//!
//! [viewport]
//! max_zoom = 1e6
//!
//! [logging]
//! level = "zoomtree=debug"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{BoundingBox, World};
use crate::measure::FontWeight;
use crate::text_layout::TextStyle;
use crate::viewport::ZoomLimits;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub viewport: ViewConfig,
    pub source: SourceConfig,
    pub logging: LoggingConfig,
}

/// Level-of-detail thresholds and text styling for the render walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub font_family: String,
    pub label_weight: FontWeight,
    pub line_height: f64,
    /// Largest font size text may be fitted at; unbounded when unset
    pub max_font_px: Option<u32>,
    /// Nodes covering more than this fraction of the canvas get no label
    pub label_max_scale: f64,
    /// Nodes covering less than this fraction are not fetched or expanded
    pub detail_min_scale: f64,
    /// Boxes narrower or shorter than this (canvas px) get no text
    pub min_text_px: f64,
    /// Share of a file's box used by its label when a preview is shown
    pub label_band: f64,
    /// Nodes visited per engine tick
    pub node_budget: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: "Monaco".to_string(),
            label_weight: FontWeight::Normal,
            line_height: 1.2,
            max_font_px: None,
            label_max_scale: 1.2,
            detail_min_scale: 0.5,
            min_text_px: 4.0,
            label_band: 0.15,
            node_budget: 512,
        }
    }
}

impl RenderConfig {
    pub fn label_style(&self) -> TextStyle {
        TextStyle {
            family: Arc::from(self.font_family.as_str()),
            weight: self.label_weight,
            line_height: self.line_height,
            max_font_px: self.max_font_px,
        }
    }

    pub fn preview_style(&self) -> TextStyle {
        TextStyle {
            weight: FontWeight::Normal,
            ..self.label_style()
        }
    }
}

/// World size and zoom behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub world_width: f64,
    pub world_height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub wheel_sensitivity: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let limits = ZoomLimits::default();
        Self {
            world_width: 1000.0,
            world_height: 1000.0,
            min_zoom: limits.min_zoom,
            max_zoom: limits.max_zoom,
            wheel_sensitivity: limits.wheel_sensitivity,
        }
    }
}

impl ViewConfig {
    pub fn limits(&self) -> ZoomLimits {
        ZoomLimits {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            wheel_sensitivity: self.wheel_sensitivity,
        }
    }

    /// World box of the root entry.
    pub fn world(&self) -> BoundingBox<World> {
        BoundingBox::from_size(self.world_width, self.world_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Metadata service base URL; the local filesystem is read when unset
    pub server: Option<String>,
    /// Bytes read for a file preview
    pub preview_bytes: usize,
    /// Fetch worker count; derived from the core count when unset
    pub fetch_threads: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            server: None,
            preview_bytes: 2048,
            fetch_threads: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Directory for daily-rotated log files
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            dir: None,
        }
    }
}

impl Config {
    /// Read `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.render.font_family, "Monaco");
        assert_eq!(config.viewport.limits(), ZoomLimits::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [render]
            label_weight = "bold"
            node_budget = 64

            [viewport]
            world_width = 2000.0

            [source]
            server = "http://localhost:3000/fs"
            "#,
        )
        .unwrap();

        assert_eq!(config.render.label_weight, FontWeight::Bold);
        assert_eq!(config.render.node_budget, 64);
        assert_eq!(config.render.line_height, 1.2);
        assert_eq!(config.viewport.world(), BoundingBox::from_size(2000.0, 1000.0));
        assert_eq!(config.source.server.as_deref(), Some("http://localhost:3000/fs"));
        assert_eq!(config.source.preview_bytes, 2048);
        assert_eq!(config.render.preview_style().weight, FontWeight::Normal);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(Config::from_toml("[render]\nline_height = \"tall\""), Err(Error::Config(_))));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Config::load(Some(&dir.path().join("none.toml"))), Err(Error::Io(_))));

        let path = dir.path().join("zoomtree.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap().logging.level, "debug");
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
