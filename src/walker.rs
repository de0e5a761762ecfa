//! Recursive level-of-detail render walk.
//!
//! A walk visits the hierarchy depth-first from the root, culling boxes
//! outside the canvas and deciding per node how much to fetch and draw from
//! how much of the canvas the node covers. Recursion is an explicit stack so
//! a walk can be stepped a bounded number of nodes at a time and abandoned
//! when its job is canceled.

use serde::Serialize;

use crate::cache::{CacheStatus, EntryCache};
use crate::config::RenderConfig;
use crate::geometry::{BoundingBox, Canvas, World};
use crate::grid::GridLayout;
use crate::measure::TextMeasurer;
use crate::scheduler::RenderJob;
use crate::source::{child_path, display_name, EntryKind, FetchKind};
use crate::surface::{Scene, Surface, Tone};
use crate::text_layout::fit_text;
use crate::viewport::Viewport;

/// A node waiting to be visited.
#[derive(Debug, Clone)]
struct Frame {
    path: String,
    name: String,
    world: BoundingBox<World>,
    level: usize,
}

/// State a walk reads and fills while stepping.
pub struct WalkEnv<'a> {
    pub cache: &'a mut EntryCache,
    pub measurer: &'a mut TextMeasurer,
    pub config: &'a RenderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkProgress {
    /// Nodes remain; step again
    Running,
    Finished,
    Canceled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    pub visited: usize,
    pub culled: usize,
    /// Nodes whose subtree was omitted while data is pending
    pub deferred: usize,
    pub expanded: usize,
    pub previews: usize,
    pub max_level: usize,
}

pub struct RenderWalk {
    job_id: u64,
    viewport: Viewport,
    canvas: BoundingBox<Canvas>,
    stack: Vec<Frame>,
    scene: Scene,
    stats: WalkStats,
}

impl RenderWalk {
    /// Start a walk for `job` over a snapshot of `viewport`.
    pub fn new(
        job: &RenderJob,
        root: &str,
        world: BoundingBox<World>,
        viewport: Viewport,
        canvas: BoundingBox<Canvas>,
    ) -> Self {
        let mut scene = Scene::default();
        scene.clear(canvas);

        Self {
            job_id: job.id,
            viewport,
            canvas,
            stack: vec![Frame {
                path: root.to_string(),
                name: display_name(root).to_string(),
                world,
                level: 0,
            }],
            scene,
            stats: WalkStats::default(),
        }
    }

    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }

    /// Visit up to `budget` nodes, checking `job.canceled` before each.
    pub fn step(&mut self, job: &RenderJob, env: &mut WalkEnv<'_>, budget: usize) -> WalkProgress {
        let mut processed = 0;
        while processed < budget {
            if job.canceled {
                return self.cancel();
            }
            let Some(frame) = self.stack.pop() else {
                break;
            };
            self.visit(frame, env);
            processed += 1;
        }

        if job.canceled {
            self.cancel()
        } else if self.stack.is_empty() {
            tracing::debug!(
                job = self.job_id,
                visited = self.stats.visited,
                culled = self.stats.culled,
                deferred = self.stats.deferred,
                commands = self.scene.len(),
                "render walk finished"
            );
            WalkProgress::Finished
        } else {
            WalkProgress::Running
        }
    }

    fn cancel(&mut self) -> WalkProgress {
        tracing::trace!(job = self.job_id, remaining = self.stack.len(), "render walk canceled");
        self.stack.clear();
        WalkProgress::Canceled
    }

    fn visit(&mut self, frame: Frame, env: &mut WalkEnv<'_>) {
        let config = env.config;
        let canvas_box = self.viewport.box_world_to_canvas(frame.world);
        if !canvas_box.intersects(&self.canvas) {
            self.stats.culled += 1;
            return;
        }
        self.stats.visited += 1;
        self.stats.max_level = self.stats.max_level.max(frame.level);
        self.scene.stroke_rect(canvas_box, Tone::Outline);

        let scale = canvas_box.area() / self.canvas.area();
        let show_label = scale <= config.label_max_scale;

        // Too small to be worth loading: name only
        if scale < config.detail_min_scale {
            if show_label {
                let tone = self.tone_for(env.cache, FetchKind::Entry, &frame.path);
                self.label(env, &frame.name, &canvas_box, tone);
            }
            return;
        }

        let kind = match env.cache.entry(&frame.path).map(|info| info.kind) {
            Some(kind) => kind,
            None => {
                self.defer(env, &frame, &canvas_box, FetchKind::Entry, show_label);
                return;
            }
        };

        match kind {
            EntryKind::Directory => {
                let Some(children) = env.cache.listing(&frame.path) else {
                    self.defer(env, &frame, &canvas_box, FetchKind::Listing, show_label);
                    return;
                };

                if children.is_empty() {
                    if show_label {
                        self.label(env, &frame.name, &canvas_box, Tone::Label);
                    }
                    return;
                }

                if show_label {
                    self.label(env, &frame.name, &canvas_box, Tone::Muted);
                }

                // Reverse so the first child is popped first
                let cells = GridLayout::layout(children.len(), frame.world);
                for cell in cells.into_iter().rev() {
                    let child = &children[cell.index];
                    self.stack.push(Frame {
                        path: child_path(&frame.path, &child.name),
                        name: child.name.clone(),
                        world: cell.rect,
                        level: frame.level + 1,
                    });
                }
                self.stats.expanded += 1;
            }
            EntryKind::File => {
                let Some(preview) = env.cache.preview(&frame.path) else {
                    self.defer(env, &frame, &canvas_box, FetchKind::Preview, show_label);
                    return;
                };

                if preview.trim().is_empty() {
                    if show_label {
                        self.label(env, &frame.name, &canvas_box, Tone::Label);
                    }
                    return;
                }

                let (band, body) = canvas_box.split_top(config.label_band);
                if show_label {
                    self.label(env, &frame.name, &band, Tone::Label);
                }
                if self.has_text_room(&body, config) {
                    fit_text(
                        &mut self.scene,
                        env.measurer,
                        &config.preview_style(),
                        &preview,
                        &body,
                        Tone::Preview,
                    );
                    self.stats.previews += 1;
                }
            }
        }
    }

    /// Draw the name of a node whose data is not resolved yet.
    fn defer(
        &mut self,
        env: &mut WalkEnv<'_>,
        frame: &Frame,
        canvas_box: &BoundingBox<Canvas>,
        kind: FetchKind,
        show_label: bool,
    ) {
        let tone = self.tone_for(env.cache, kind, &frame.path);
        if tone != Tone::Error {
            self.stats.deferred += 1;
        }
        if show_label {
            self.label(env, &frame.name, canvas_box, tone);
        }
    }

    fn tone_for(&self, cache: &EntryCache, kind: FetchKind, path: &str) -> Tone {
        match cache.status(kind, path) {
            CacheStatus::Failed => Tone::Error,
            _ => Tone::Label,
        }
    }

    fn label(&mut self, env: &mut WalkEnv<'_>, text: &str, bounds: &BoundingBox<Canvas>, tone: Tone) {
        if !self.has_text_room(bounds, env.config) {
            return;
        }
        fit_text(
            &mut self.scene,
            env.measurer,
            &env.config.label_style(),
            text,
            bounds,
            tone,
        );
    }

    fn has_text_room(&self, bounds: &BoundingBox<Canvas>, config: &RenderConfig) -> bool {
        bounds.width >= config.min_text_px && bounds.height >= config.min_text_px
    }
}
