//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A projected bounding box in map units.
///
/// The extent of a raster is always the outer edge of its cells
/// (pixel-is-area), never the centers of the edge cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when min < max on both axes.
    pub fn is_valid(&self) -> bool {
        self.min_x < self.max_x && self.min_y < self.max_y
    }

    /// Shrink the box by `dx` on the left/right edges and `dy` on the top/bottom edges.
    ///
    /// Returns `None` when the inset would collapse the box.
    pub fn inset(&self, dx: f64, dy: f64) -> Option<BoundingBox> {
        let inset = BoundingBox {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x - dx,
            max_y: self.max_y - dy,
        };
        inset.is_valid().then_some(inset)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}
