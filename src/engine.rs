use glam::DVec2;

use crate::cache::EntryCache;
use crate::config::{Config, RenderConfig};
use crate::geometry::{BoundingBox, Canvas, Point, World};
use crate::measure::{GlyphMetrics, TextMeasurer};
use crate::scheduler::{RenderJob, RenderScheduler};
use crate::source::{FetchOutcome, FetchRequest};
use crate::surface::Scene;
use crate::viewport::{Viewport, ZoomLimits};
use crate::walker::{RenderWalk, WalkEnv, WalkProgress, WalkStats};

/// What one [`MapEngine::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Job the tick stepped, if any
    pub job: Option<u64>,
    pub progress: Option<WalkProgress>,
    /// A finished walk replaced the presented scene
    pub presented: bool,
    pub stats: Option<WalkStats>,
}

/// Owner of all map state: viewport, caches, scheduling and the current walk.
///
/// Everything runs on the caller's thread. Input handlers call `pan`,
/// `zoom_at` and friends; fetch completions come in through `apply`; the
/// front end calls `tick` once per frame and paints `scene`.
pub struct MapEngine {
    root: String,
    world: BoundingBox<World>,
    canvas: BoundingBox<Canvas>,
    viewport: Viewport,
    limits: ZoomLimits,
    config: RenderConfig,
    cache: EntryCache,
    scheduler: RenderScheduler,
    measurer: TextMeasurer,
    walk: Option<RenderWalk>,
    scene: Scene,
    presented_job: Option<u64>,
}

impl MapEngine {
    pub fn new(root: impl Into<String>, config: &Config) -> Self {
        let world = config.viewport.world();
        Self {
            root: root.into(),
            world,
            canvas: BoundingBox::from_size(world.width, world.height),
            viewport: Viewport::default(),
            limits: config.viewport.limits(),
            config: config.render.clone(),
            cache: EntryCache::new(),
            scheduler: RenderScheduler::new(),
            measurer: TextMeasurer::default(),
            walk: None,
            scene: Scene::default(),
            presented_job: None,
        }
    }

    /// Swap the glyph metrics backend; cached widths are dropped.
    pub fn set_metrics(&mut self, metrics: Box<dyn GlyphMetrics>) {
        self.measurer.set_metrics(metrics);
        self.request_render();
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn world(&self) -> BoundingBox<World> {
        self.world
    }

    pub fn canvas(&self) -> BoundingBox<Canvas> {
        self.canvas
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn cache(&self) -> &EntryCache {
        &self.cache
    }

    pub fn measurer(&self) -> &TextMeasurer {
        &self.measurer
    }

    /// Last scene drawn by a walk that finished uncanceled.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn presented_job(&self) -> Option<u64> {
        self.presented_job
    }

    pub fn active_job(&self) -> Option<RenderJob> {
        self.scheduler.active().copied()
    }

    /// Resize the canvas; re-renders when the size changed.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        if self.canvas.width == width && self.canvas.height == height {
            return;
        }
        self.canvas = BoundingBox::from_size(width, height);
        self.request_render();
    }

    /// Move the view by a canvas-space drag delta.
    pub fn pan(&mut self, canvas_delta: DVec2) {
        if canvas_delta == DVec2::ZERO {
            return;
        }
        self.viewport.pan(canvas_delta);
        self.request_render();
    }

    /// Zoom around `pointer`; negative deltas zoom in.
    pub fn zoom_at(&mut self, pointer: Point<Canvas>, wheel_delta: f64) {
        if wheel_delta == 0.0 {
            return;
        }
        self.viewport.zoom_at(pointer, wheel_delta, &self.limits);
        self.request_render();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport {
            zoom: self.limits.clamp(viewport.zoom),
            ..viewport
        };
        self.request_render();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.request_render();
    }

    /// Ask for a fresh render, superseding any walk in progress.
    pub fn request_render(&mut self) {
        if let Some(job) = self.scheduler.request_render() {
            self.start_walk(&job);
        }
    }

    fn start_walk(&mut self, job: &RenderJob) {
        self.walk = Some(RenderWalk::new(job, &self.root, self.world, self.viewport, self.canvas));
    }

    /// Store a fetch completion; anything new triggers a render.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        self.apply_all(std::iter::once(outcome)) > 0
    }

    /// Store a batch of completions, requesting at most one render for all
    /// of them. Returns how many changed the cache.
    pub fn apply_all(&mut self, outcomes: impl IntoIterator<Item = FetchOutcome>) -> usize {
        let changed = outcomes
            .into_iter()
            .map(|outcome| self.cache.apply(outcome))
            .filter(|changed| *changed)
            .count();
        if changed > 0 {
            tracing::trace!(changed, "applied fetch completions");
            self.request_render();
        }
        changed
    }

    /// Fetches queued by walks since the last call.
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        self.cache.take_requests()
    }

    /// Step the active walk by up to `budget` nodes.
    pub fn tick(&mut self, budget: usize) -> TickReport {
        let Some(job) = self.scheduler.active().copied() else {
            return TickReport::default();
        };
        if self.walk.as_ref().map(RenderWalk::job_id) != Some(job.id) {
            self.start_walk(&job);
        }
        let Some(walk) = self.walk.as_mut() else {
            return TickReport::default();
        };

        let mut env = WalkEnv {
            cache: &mut self.cache,
            measurer: &mut self.measurer,
            config: &self.config,
        };
        let progress = walk.step(&job, &mut env, budget);
        let stats = walk.stats();
        let mut presented = false;

        if progress != WalkProgress::Running {
            if let Some(walk) = self.walk.take() {
                if progress == WalkProgress::Finished {
                    self.scene = walk.into_scene();
                    self.presented_job = Some(job.id);
                    presented = true;
                }
            }
            if let Some(next) = self.scheduler.complete(job.id) {
                self.start_walk(&next);
            }
        }

        TickReport {
            job: Some(job.id),
            progress: Some(progress),
            presented,
            stats: Some(stats),
        }
    }

    /// A walk is active or waiting to be stepped.
    pub fn is_walking(&self) -> bool {
        !self.scheduler.is_idle()
    }

    /// No walk to step and no fetch waiting to be handed out.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle() && !self.cache.has_queued_requests()
    }
}
