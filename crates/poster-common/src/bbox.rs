//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::point::PlanarPoint;

/// Smallest extent substituted for a zero-width or zero-height axis.
pub const MIN_EXTENT: f64 = 1e-9;

/// Bounding box of a set of planar points.
///
/// Always derived from data via [`BoundingBox::from_points`]; consumers must
/// go through [`BoundingBox::safe_width`]/[`BoundingBox::safe_height`] when
/// dividing by the extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a bounding box from corner coordinates, normalising the order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Compute the bounding box of a point set. `None` for an empty slice.
    pub fn from_points(points: &[PlanarPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Width, substituting [`MIN_EXTENT`] for a degenerate axis.
    pub fn safe_width(&self) -> f64 {
        self.width().max(MIN_EXTENT)
    }

    /// Height, substituting [`MIN_EXTENT`] for a degenerate axis.
    pub fn safe_height(&self) -> f64 {
        self.height().max(MIN_EXTENT)
    }

    /// True when either axis has zero extent (single point, straight
    /// horizontal or vertical route).
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn center(&self) -> PlanarPoint {
        PlanarPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}
