//! Correction surface encoding.
//!
//! The point-correction tool subtracts a gridded surface from point
//! elevations and then adds a constant bias back. It cannot handle
//! negative surface values, so the fitted correction is shifted up until
//! its minimum sits at a small positive floor:
//!
//! ```text
//! vcorr   = min(correction) - floor
//! encoded = correction - vcorr          (min(encoded) == floor)
//! bias    = -vcorr
//!
//! z' = z - encoded + bias = z - correction
//! ```

use dewarp_common::{BoundingBox, ElevationGrid, GridSpec};
use tracing::debug;

use crate::error::{GridProcessorError, Result};

/// A correction surface shifted to be strictly positive, plus the shift.
#[derive(Debug, Clone)]
pub struct EncodedCorrection {
    surface: ElevationGrid,
    shift: f64,
}

impl EncodedCorrection {
    /// Shift `correction` so its minimum equals `floor`.
    ///
    /// Every cell must be finite; the correction is evaluated from a
    /// polynomial and never has holes.
    pub fn encode(correction: &ElevationGrid, floor: f64) -> Result<Self> {
        if correction.spec().is_empty() {
            return Err(GridProcessorError::EmptyCorrection);
        }

        let non_finite = correction.values().iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            return Err(GridProcessorError::NonFiniteCorrection { count: non_finite });
        }

        let min = correction
            .min_valid()
            .ok_or(GridProcessorError::EmptyCorrection)?;
        let shift = min - floor;
        let surface = correction.map(|v| v - shift);

        debug!(
            min,
            shift,
            bias = -shift,
            "Encoded correction surface"
        );

        Ok(Self { surface, shift })
    }

    /// The shifted surface handed to the point-correction tool.
    pub fn surface(&self) -> &ElevationGrid {
        &self.surface
    }

    /// Amount subtracted from the raw correction (`vcorr`).
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Constant added back to every corrected point.
    pub fn bias_elevation(&self) -> f64 {
        -self.shift
    }

    /// Recover the unshifted correction surface.
    pub fn decode(&self) -> ElevationGrid {
        let shift = self.shift;
        self.surface.map(|v| v + shift)
    }
}

/// Extent used to clip the corrected cloud: the grid extent inset by
/// `margin_cells` cells on every side.
pub fn clip_extent(spec: &GridSpec, margin_cells: f64) -> Result<BoundingBox> {
    if !margin_cells.is_finite() || margin_cells < 0.0 {
        return Err(GridProcessorError::InvalidMargin(format!(
            "margin must be a finite value >= 0, got {}",
            margin_cells
        )));
    }

    spec.extent
        .inset(margin_cells * spec.dx, margin_cells * spec.dy)
        .ok_or_else(|| {
            GridProcessorError::InvalidMargin(format!(
                "{} cell margin leaves nothing of a {}x{} grid",
                margin_cells, spec.width, spec.height
            ))
        })
}
