use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use serde::Serialize;

use zoomtree::cache::CacheStats;
use zoomtree::cli::DumpArgs;
use zoomtree::measure::FontdueMetrics;
use zoomtree::surface::{DrawCommand, Tone};
use zoomtree::viewport::Viewport;
use zoomtree::{logging, Scene, Session};

#[derive(Serialize)]
struct DumpOutput<'a> {
    root: &'a str,
    viewport: ViewportOut,
    settled: bool,
    cache: CacheStats,
    scene: &'a Scene,
}

#[derive(Serialize)]
struct ViewportOut {
    top: f64,
    left: f64,
    zoom: f64,
    width: f64,
    height: f64,
}

fn main() -> anyhow::Result<()> {
    let args = DumpArgs::parse();
    let config = args.common.load_config().context("Failed to load config")?;
    let _log_guard = logging::init(&config.logging);

    let mut session =
        Session::open(&args.common.root, &config).with_context(|| format!("Failed to open {}", args.common.root))?;
    if let Some(path) = &args.common.font {
        let metrics = FontdueMetrics::from_file(path).with_context(|| format!("Failed to load font {}", path.display()))?;
        session.engine_mut().set_metrics(Box::new(metrics));
    }

    let engine = session.engine_mut();
    engine.resize(args.width, args.height);
    engine.set_viewport(args.viewport());

    let settled = session.run_until_idle(Duration::from_secs(args.timeout));
    if !settled {
        tracing::warn!(in_flight = session.in_flight(), "printing an unsettled map");
    }

    let engine = session.engine();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        let viewport = engine.viewport();
        let canvas = engine.canvas();
        let output = DumpOutput {
            root: engine.root(),
            viewport: ViewportOut {
                top: viewport.top,
                left: viewport.left,
                zoom: viewport.zoom,
                width: canvas.width,
                height: canvas.height,
            },
            settled,
            cache: engine.cache().stats(),
            scene: engine.scene(),
        };
        serde_json::to_writer_pretty(&mut out, &output)?;
        writeln!(out)?;
    } else {
        print_summary(&mut out, engine.root(), engine.viewport(), engine.scene(), engine.cache().stats(), settled)?;
    }

    Ok(())
}

fn print_summary(
    out: &mut impl Write,
    root: &str,
    viewport: &Viewport,
    scene: &Scene,
    stats: CacheStats,
    settled: bool,
) -> io::Result<()> {
    writeln!(
        out,
        "{} at top={} left={} zoom={}{}",
        root,
        viewport.top,
        viewport.left,
        viewport.zoom,
        if settled { "" } else { " (unsettled)" }
    )?;
    writeln!(out, "{} draw commands", scene.len())?;
    for (tone, count) in scene.tone_counts() {
        writeln!(out, "  {:<8} {}", format!("{:?}", tone).to_lowercase(), count)?;
    }

    let labels: Vec<&str> = scene.texts(Tone::Label).take(12).collect();
    if !labels.is_empty() {
        writeln!(out, "labels: {}", labels.join(", "))?;
    }
    let largest_text = scene
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text { font, .. } => Some(font.size),
            _ => None,
        })
        .max();
    if let Some(size) = largest_text {
        writeln!(out, "largest font: {}px", size)?;
    }

    for (name, counts) in [
        ("entries", stats.entries),
        ("listings", stats.listings),
        ("previews", stats.previews),
    ] {
        writeln!(
            out,
            "{:<9} resolved {:>5}  pending {:>3}  failed {:>3}",
            name, counts.resolved, counts.pending, counts.failed
        )?;
    }
    Ok(())
}
