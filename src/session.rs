use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::engine::{MapEngine, TickReport};
use crate::error::Result;
use crate::fetcher::FetchPool;
use crate::source::{EntrySource, HttpSource, LocalSource};

/// A [`MapEngine`] wired to a [`FetchPool`].
pub struct Session {
    engine: MapEngine,
    pool: FetchPool,
}

impl Session {
    pub fn new(engine: MapEngine, pool: FetchPool) -> Self {
        Self { engine, pool }
    }

    /// Open `root` from the configured metadata server, or from the local
    /// filesystem when no server is set.
    pub fn open(root: &str, config: &Config) -> Result<Self> {
        let (source, root_path): (Arc<dyn EntrySource>, String) = match &config.source.server {
            Some(url) => {
                tracing::info!(%url, root, "reading entries from server");
                (Arc::new(HttpSource::new(url.clone())), root.to_string())
            }
            None => {
                let (base, root_path) = local_root(Path::new(root))?;
                tracing::info!(base = %base.display(), root = %root_path, "reading local entries");
                (Arc::new(LocalSource::new(base, config.source.preview_bytes)), root_path)
            }
        };

        let pool = FetchPool::new(source, config.source.fetch_threads)?;
        let mut engine = MapEngine::new(root_path, config);
        engine.request_render();
        Ok(Self::new(engine, pool))
    }

    pub fn engine(&self) -> &MapEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MapEngine {
        &mut self.engine
    }

    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    /// Apply arrived completions, step the walk once, hand out new fetches.
    pub fn pump(&mut self) -> TickReport {
        let outcomes = self.pool.drain();
        self.engine.apply_all(outcomes);
        let report = self.engine.tick(self.engine.config().node_budget);
        let requests = self.engine.take_fetch_requests();
        if !requests.is_empty() {
            tracing::trace!(count = requests.len(), "dispatching fetches");
            self.pool.dispatch(requests);
        }
        report
    }

    /// Nothing to walk, queue or wait for.
    pub fn is_idle(&self) -> bool {
        self.engine.is_idle() && self.pool.in_flight() == 0
    }

    /// Pump until idle. Returns `false` if `timeout` elapsed first.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.is_idle() {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    in_flight = self.pool.in_flight(),
                    walking = self.engine.is_walking(),
                    "gave up waiting for the map to settle"
                );
                return false;
            }
            if !self.engine.is_walking() {
                if let Some(outcome) = self.pool.wait(deadline - now) {
                    self.engine.apply(outcome);
                }
            }
        }
    }
}

/// Split a local root into the directory the source is confined to and the
/// path of the root inside it, so the root is labelled with its own name.
fn local_root(root: &Path) -> Result<(PathBuf, String)> {
    let root = root.canonicalize()?;
    match (root.parent(), root.file_name()) {
        (Some(parent), Some(name)) => Ok((parent.to_path_buf(), format!("./{}", name.to_string_lossy()))),
        _ => Ok((root, ".".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::cache::CacheStatus;
    use crate::geometry::Point;
    use crate::source::FetchKind;
    use crate::surface::Tone;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/readme.md"), "# Title\nbody text\n").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "remember\n").unwrap();
        dir
    }

    #[test]
    fn test_local_root_split() {
        let dir = fixture();
        let (base, root) = local_root(&dir.path().join("docs")).unwrap();

        assert_eq!(base, dir.path().canonicalize().unwrap());
        assert_eq!(root, "./docs");
        assert!(local_root(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_session_settles_over_directory() {
        let dir = fixture();
        let root = dir.path().to_string_lossy().to_string();
        let mut session = Session::open(&root, &Config::default()).unwrap();

        assert!(session.run_until_idle(Duration::from_secs(10)));
        let name = dir.path().file_name().unwrap().to_string_lossy().to_string();
        let engine = session.engine();

        assert_eq!(engine.scene().texts(Tone::Muted).collect::<Vec<_>>(), vec![name.as_str()]);
        assert_eq!(
            engine.scene().texts(Tone::Label).collect::<Vec<_>>(),
            vec!["docs", "notes.txt", "src"]
        );
        assert_eq!(engine.cache().stats().pending(), 0);
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn test_zooming_in_loads_nested_preview() {
        let dir = fixture();
        let root = dir.path().to_string_lossy().to_string();
        let mut session = Session::open(&root, &Config::default()).unwrap();
        assert!(session.run_until_idle(Duration::from_secs(10)));

        // Zoom 2x anchored at the origin: "docs" fills the canvas
        session.engine_mut().zoom_at(Point::new(0.0, 0.0), -500.0);
        assert!(session.run_until_idle(Duration::from_secs(10)));

        let engine = session.engine();
        let docs = format!("{}/docs", engine.root());
        let readme = format!("{}/readme.md", docs);
        assert_eq!(engine.cache().status(FetchKind::Listing, &docs), CacheStatus::Resolved);
        assert_eq!(engine.cache().status(FetchKind::Preview, &readme), CacheStatus::Resolved);
        assert!(engine.scene().texts(Tone::Label).any(|text| text == "readme.md"));
        assert_eq!(
            engine.scene().texts(Tone::Preview).collect::<Vec<_>>(),
            vec!["#", "Title", "body", "text"]
        );

        // Siblings to the right and below are off-canvas
        assert_eq!(engine.cache().status(FetchKind::Listing, &format!("{}/src", engine.root())), CacheStatus::Absent);
    }
}
