//! Tracing setup for the binaries.
//!
//! Console output is filtered by `RUST_LOG` when set and by
//! `logging.level` from the config otherwise:
//! - `RUST_LOG=debug` - everything at debug
//! - `RUST_LOG=zoomtree::walker=debug` - walk summaries only
//! - `RUST_LOG=zoomtree::cache=trace` - every queued fetch
//!
//! When `logging.dir` is set, a daily-rotated `zoomtree.log` is written there
//! at debug level.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process so buffered
/// file output is flushed.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let (file_layer, guard) = match &config.dir {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, "zoomtree.log");
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug"));
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("Warning: Could not create log directory {}: {}", dir.display(), e);
                (None, None)
            }
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
