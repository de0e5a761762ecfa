//! Command-line arguments for the `zoomtree` window and the headless
//! `zoomtree-dump` runner.
//!
//! Flags override the matching config file settings.

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::config::Config;
use crate::error::Result;
use crate::viewport::Viewport;

/// Arguments shared by both binaries
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Directory to map, or the root path on the server with --server
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: String,

    /// Base URL of a metadata service (entry, listdir and preview endpoints)
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// TTF/OTF font used for text
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Fetch worker threads
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,
}

impl CommonArgs {
    /// Load the config file (or defaults) and apply flag overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(server) = &self.server {
            config.source.server = Some(server.clone());
        }
        if let Some(threads) = self.threads {
            config.source.fetch_threads = Some(threads);
        }
        Ok(config)
    }
}

/// Zoomable map of a directory tree
#[derive(Parser, Debug)]
#[command(name = "zoomtree", version, about = "Zoomable map of a directory tree")]
pub struct GuiArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Render a directory map without a window and print the draw commands
#[derive(Parser, Debug)]
#[command(name = "zoomtree-dump", version, about = "Render a directory map headlessly")]
pub struct DumpArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1000.0)]
    pub width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 1000.0)]
    pub height: f64,

    /// World y at the top edge of the canvas
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub top: f64,

    /// World x at the left edge of the canvas
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub left: f64,

    #[arg(long, default_value_t = 1.0)]
    pub zoom: f64,

    /// Print the scene as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Seconds to wait for fetches before printing what is there
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,
}

impl DumpArgs {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.top, self.left, self.zoom)
    }
}
