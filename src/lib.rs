//! Infinitely zoomable map of a directory tree.
//!
//! Each directory divides its box into a grid of cells for its children and
//! each file shows a preview of its contents once it is large enough on
//! screen. A [`MapEngine`] walks the visible part of the hierarchy with
//! level-of-detail rules, fetching metadata lazily through an
//! [`EntrySource`] and drawing into a [`Scene`] that front ends replay.

pub mod cache;
pub mod cli;
pub mod config;
pub mod egui_backend;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod measure;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod surface;
pub mod text_layout;
pub mod viewport;
pub mod walker;

pub use config::Config;
pub use engine::{MapEngine, TickReport};
pub use error::{Error, Result};
pub use session::Session;
pub use source::EntrySource;
pub use surface::Scene;
