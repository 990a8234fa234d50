//! Page-space rectangles
//!
//! Coordinates are page user-space points. Rectangles are always stored
//! normalized so that `x0 <= x1` and `y0 <= y1`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Build a rectangle from two corners in any order
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// US Letter page (612 x 792 points)
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, 612.0, 792.0)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Grow the rectangle by `margin` points on every side
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x0: self.x0 - margin,
            y0: self.y0 - margin,
            x1: self.x1 + margin,
            y1: self.y1 + margin,
        }
    }

    /// Intersect with `bounds`. A rectangle lying entirely outside
    /// collapses to a zero-area rectangle on the nearest edge.
    pub fn clip_to(&self, bounds: &Rect) -> Self {
        let x0 = self.x0.max(bounds.x0).min(bounds.x1);
        let y0 = self.y0.max(bounds.y0).min(bounds.y1);
        Self {
            x0,
            y0,
            x1: self.x1.min(bounds.x1).max(x0),
            y1: self.y1.min(bounds.y1).max(y0),
        }
    }

    /// Inclusive point containment
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Left-hand column of `bounds`: `width` points wide, full height. A
    /// non-positive width gives an empty column on the left edge.
    pub fn left_clip(bounds: &Rect, width: f64) -> Self {
        Self::new(
            bounds.x0,
            bounds.y0,
            (bounds.x0 + width.max(0.0)).min(bounds.x1),
            bounds.y1,
        )
    }
}
