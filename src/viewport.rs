use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Canvas, Point, Screen, World};

/// Camera over the world: `canvas = (world - offset) * zoom`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// World-space y shown at the canvas origin
    pub top: f64,
    /// World-space x shown at the canvas origin
    pub left: f64,
    /// Uniform world to canvas scale
    pub zoom: f64,
}

/// Zoom bounds and wheel response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Fraction of zoom change per unit of wheel delta
    pub wheel_sensitivity: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 1e9,
            wheel_sensitivity: 0.002,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(top: f64, left: f64, zoom: f64) -> Self {
        Self { top, left, zoom }
    }

    pub fn offset(&self) -> DVec2 {
        DVec2::new(self.left, self.top)
    }

    fn set_offset(&mut self, offset: DVec2) {
        self.left = offset.x;
        self.top = offset.y;
    }

    pub fn point_world_to_canvas(&self, p: Point<World>) -> Point<Canvas> {
        Point::from_vec((p.to_vec() - self.offset()) * self.zoom)
    }

    pub fn point_canvas_to_world(&self, p: Point<Canvas>) -> Point<World> {
        Point::from_vec(p.to_vec() / self.zoom + self.offset())
    }

    pub fn box_world_to_canvas(&self, b: BoundingBox<World>) -> BoundingBox<Canvas> {
        BoundingBox::new(
            (b.top - self.top) * self.zoom,
            (b.left - self.left) * self.zoom,
            b.width * self.zoom,
            b.height * self.zoom,
        )
    }

    pub fn box_canvas_to_world(&self, b: BoundingBox<Canvas>) -> BoundingBox<World> {
        BoundingBox::new(
            b.top / self.zoom + self.top,
            b.left / self.zoom + self.left,
            b.width / self.zoom,
            b.height / self.zoom,
        )
    }

    /// Drag by a canvas-space delta; dragging right moves the visible world left.
    pub fn pan(&mut self, canvas_delta: DVec2) {
        let offset = self.offset() - canvas_delta / self.zoom;
        self.set_offset(offset);
    }

    /// Scale around `pointer` so the world point under it stays put.
    ///
    /// Positive `wheel_delta` zooms out, matching browser wheel semantics.
    pub fn zoom_at(&mut self, pointer: Point<Canvas>, wheel_delta: f64, limits: &ZoomLimits) {
        let pointer_world = self.point_canvas_to_world(pointer);
        let new_zoom = limits.clamp(self.zoom * (1.0 - wheel_delta * limits.wheel_sensitivity));

        self.zoom = new_zoom;
        self.set_offset(pointer_world.to_vec() - pointer.to_vec() / new_zoom);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Maps window coordinates onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    /// Screen position of the canvas origin
    pub origin: DVec2,
    pub pixels_per_point: f64,
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self {
            origin: DVec2::ZERO,
            pixels_per_point: 1.0,
        }
    }
}

impl ScreenTransform {
    pub fn new(origin: DVec2, pixels_per_point: f64) -> Self {
        Self {
            origin,
            pixels_per_point,
        }
    }

    pub fn point_screen_to_canvas(&self, p: Point<Screen>) -> Point<Canvas> {
        Point::from_vec((p.to_vec() - self.origin) * self.pixels_per_point)
    }

    pub fn point_canvas_to_screen(&self, p: Point<Canvas>) -> Point<Screen> {
        Point::from_vec(p.to_vec() / self.pixels_per_point + self.origin)
    }

    /// Screen deltas only scale; the origin cancels out.
    pub fn delta_screen_to_canvas(&self, delta: DVec2) -> DVec2 {
        delta * self.pixels_per_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn test_world_to_canvas() {
        let viewport = Viewport::new(100.0, 50.0, 2.0);

        let p = viewport.point_world_to_canvas(Point::new(60.0, 130.0));
        assert!(close(p.x, 20.0));
        assert!(close(p.y, 60.0));
    }

    #[test]
    fn test_roundtrip_conversion() {
        for viewport in [
            Viewport::default(),
            Viewport::new(-12.5, 300.0, 0.5),
            Viewport::new(1e4, -7.25, 3.7e5),
        ] {
            for (x, y) in [(0.0, 0.0), (123.45, 678.90), (-999.0, 1e3)] {
                let world = Point::<World>::new(x, y);
                let back = viewport.point_canvas_to_world(viewport.point_world_to_canvas(world));
                assert!(close(back.x, x), "x {} != {}", back.x, x);
                assert!(close(back.y, y), "y {} != {}", back.y, y);
            }
        }
    }

    #[test]
    fn test_box_roundtrip() {
        let viewport = Viewport::new(3.0, -4.0, 1.75);
        let b = BoundingBox::<World>::new(10.0, 20.0, 30.0, 40.0);
        let back = viewport.box_canvas_to_world(viewport.box_world_to_canvas(b));

        assert!(close(back.top, b.top));
        assert!(close(back.left, b.left));
        assert!(close(back.width, b.width));
        assert!(close(back.height, b.height));
    }

    #[test]
    fn test_pan_moves_world_against_drag() {
        let mut viewport = Viewport::new(0.0, 0.0, 2.0);
        viewport.pan(DVec2::new(100.0, -50.0));

        assert!(close(viewport.left, -50.0));
        assert!(close(viewport.top, 25.0));
    }

    #[test]
    fn test_zoom_keeps_pointer_anchored() {
        let limits = ZoomLimits::default();
        let mut viewport = Viewport::new(40.0, -30.0, 1.3);
        let pointer = Point::<Canvas>::new(420.0, 180.0);

        for delta in [-120.0, -50.0, 35.0, 200.0] {
            let before = viewport.point_canvas_to_world(pointer);
            viewport.zoom_at(pointer, delta, &limits);
            let after = viewport.point_world_to_canvas(before);

            assert!(close(after.x, pointer.x), "x drifted to {}", after.x);
            assert!(close(after.y, pointer.y), "y drifted to {}", after.y);
        }
    }

    #[test]
    fn test_zoom_clamped_at_min() {
        let limits = ZoomLimits::default();
        let mut viewport = Viewport::default();

        viewport.zoom_at(Point::new(500.0, 500.0), 10_000.0, &limits);
        assert_eq!(viewport.zoom, 0.5);

        viewport.zoom_at(Point::new(500.0, 500.0), -100.0, &limits);
        assert!(viewport.zoom > 0.5);
    }

    #[test]
    fn test_screen_transform_roundtrip() {
        let transform = ScreenTransform::new(DVec2::new(8.0, 64.0), 2.0);
        let canvas = transform.point_screen_to_canvas(Point::new(108.0, 164.0));

        assert!(close(canvas.x, 200.0));
        assert!(close(canvas.y, 200.0));

        let screen = transform.point_canvas_to_screen(canvas);
        assert!(close(screen.x, 108.0));
        assert!(close(screen.y, 164.0));
    }

    #[test]
    fn test_reset() {
        let mut viewport = Viewport::new(5.0, 6.0, 7.0);
        viewport.reset();
        assert_eq!(viewport, Viewport::default());
    }
}
