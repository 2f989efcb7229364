//! Planar points, pixel rectangles and the fit transform.

use serde::{Deserialize, Serialize};

/// A point in the route's local planar space.
///
/// Units are arbitrary (scaled degrees); only relative distances and angles
/// are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for PlanarPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in pixel space (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink the rectangle by `dx` on the left and right and `dy` on the top
    /// and bottom. Never produces a negative size.
    pub fn inset(&self, dx: f64, dy: f64) -> Rect {
        let dx = dx.min(self.width / 2.0);
        let dy = dy.min(self.height / 2.0);
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width - 2.0 * dx,
            height: self.height - 2.0 * dy,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x() && x <= self.max_x() && y >= self.min_y() && y <= self.max_y()
    }

    /// Integer pixel size, rounded to the nearest pixel and at least 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// Uniform scale + translate that maps planar route space into pixel space.
///
/// The y-axis is flipped (north up): increasing planar `y` moves the output
/// point up the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub translate: (f64, f64),
}

impl Transform {
    pub const fn new(scale: f64, translate: (f64, f64)) -> Self {
        Self { scale, translate }
    }

    /// Map a planar point into pixel space.
    #[inline]
    pub fn apply(&self, p: PlanarPoint) -> PlanarPoint {
        PlanarPoint {
            x: p.x * self.scale + self.translate.0,
            y: self.translate.1 - p.y * self.scale,
        }
    }

    /// Map every point of a slice.
    pub fn apply_all(&self, points: &[PlanarPoint]) -> Vec<PlanarPoint> {
        points.iter().map(|p| self.apply(*p)).collect()
    }

    /// Map a pixel-space point back into planar space.
    ///
    /// Returns `None` when the scale is zero (the transform collapsed the route).
    pub fn invert(&self, p: PlanarPoint) -> Option<PlanarPoint> {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return None;
        }
        Some(PlanarPoint {
            x: (p.x - self.translate.0) / self.scale,
            y: (self.translate.1 - p.y) / self.scale,
        })
    }
}
