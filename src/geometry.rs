use std::marker::PhantomData;

use glam::DVec2;
use serde::Serialize;

/// World space: the fixed layout coordinates of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct World;

/// Canvas space: pixels of the drawing surface, origin at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas;

/// Screen space: window coordinates as delivered by input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen;

/// A point tagged with the coordinate space it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S> Point<S> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }

    pub fn from_vec(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }

    pub fn to_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Axis-aligned box tagged with its coordinate space.
///
/// World and canvas boxes are different types so a box can only cross
/// spaces through [`crate::viewport::Viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct BoundingBox<S> {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S> BoundingBox<S> {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
            space: PhantomData,
        }
    }

    /// Box of the given size anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn top_left(&self) -> Point<S> {
        Point::new(self.left, self.top)
    }

    pub fn center(&self) -> Point<S> {
        Point::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    pub fn contains(&self, point: Point<S>) -> bool {
        point.x >= self.left && point.x <= self.right() && point.y >= self.top && point.y <= self.bottom()
    }

    /// Overlap with `other`, or `None` unless it has positive area.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Self::new(top, left, right - left, bottom - top))
        } else {
            None
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Split into a band of `fraction` of the height on top and the rest below.
    pub fn split_top(&self, fraction: f64) -> (Self, Self) {
        let band = self.height * fraction.clamp(0.0, 1.0);
        (
            Self::new(self.top, self.left, self.width, band),
            Self::new(self.top + band, self.left, self.width, self.height - band),
        )
    }
}
