//! Page-space geometry.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page units (1 unit = 1/72 inch).
///
/// The origin is the top-left corner of the page and `y` grows downward,
/// so `y0` is the top edge and `x0` the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    /// Create a bounding box from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a bounding box from an origin and a size.
    pub fn from_origin(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Top edge, used as the primary reading-order key.
    pub fn top(&self) -> f32 {
        self.y0
    }

    /// Left edge, used as the secondary reading-order key.
    pub fn left(&self) -> f32 {
        self.x0
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// True when the box covers no area.
    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }

    /// Scale every coordinate by `factor` (page units to pixels).
    pub fn scale(&self, factor: f32) -> Self {
        Self::new(
            self.x0 * factor,
            self.y0 * factor,
            self.x1 * factor,
            self.y1 * factor,
        )
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }
}
