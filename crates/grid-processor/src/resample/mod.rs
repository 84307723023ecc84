//! Grid alignment.
//!
//! Every surface in a comparison is moved onto the pixel grid of the first
//! rasterized surface before any cell-wise arithmetic happens. The
//! [`Aligner`] holds that target grid and resamples the others onto it,
//! the same way a VRT built with a fixed target extent and resolution
//! would.
//!
//! ```text
//! first surface ──► GridSpec (extent, dx, dy, crs)
//!                          │
//! reference ──────► align ─┤
//! prior map ──────► align ─┤
//!                          ▼
//!                 identical (width, height, dx, dy)
//! ```

pub mod interpolation;

pub use interpolation::{bilinear_sample, nearest_sample};

use dewarp_common::{ElevationGrid, GridSpec};
use tracing::debug;

use crate::error::{GridProcessorError, Result};
use crate::types::ResampleMethod;

/// Resamples surfaces onto a fixed target grid.
#[derive(Debug, Clone, Copy)]
pub struct Aligner {
    target: GridSpec,
    method: ResampleMethod,
}

impl Aligner {
    pub fn new(target: GridSpec, method: ResampleMethod) -> Self {
        Self { target, method }
    }

    /// Use the first surface's geometry as the alignment target.
    pub fn from_reference(first: &ElevationGrid, method: ResampleMethod) -> Self {
        Self::new(*first.spec(), method)
    }

    pub fn target(&self) -> &GridSpec {
        &self.target
    }

    pub fn method(&self) -> ResampleMethod {
        self.method
    }

    /// Resample `grid` onto the target grid.
    ///
    /// Target cells whose centers fall outside `grid` are missing. Grids
    /// already on the target geometry are copied through unchanged.
    pub fn align(&self, grid: &ElevationGrid) -> ElevationGrid {
        let source = grid.spec();
        if source.same_geometry(&self.target) {
            // Same cells; adopt the target's exact geometry and CRS tag
            return ElevationGrid::new(self.target, grid.values().to_vec())
                .unwrap_or_else(|_| ElevationGrid::missing(self.target));
        }

        debug!(
            source = %source.describe(),
            target = %self.target.describe(),
            method = %self.method,
            "Resampling surface onto alignment grid"
        );

        let data = grid.values();
        let (width, height) = (source.width, source.height);

        ElevationGrid::from_fn(self.target, |x, y| {
            let (px, py) = source.pixel_position(x, y);
            match self.method {
                ResampleMethod::Nearest => nearest_sample(data, width, height, px, py),
                ResampleMethod::Bilinear => bilinear_sample(data, width, height, px, py),
            }
        })
    }

    /// Check that every named surface sits exactly on the target grid.
    pub fn verify<'a>(
        &self,
        surfaces: impl IntoIterator<Item = (&'a str, &'a ElevationGrid)>,
    ) -> Result<()> {
        for (name, grid) in surfaces {
            let spec = grid.spec();
            if !spec.same_geometry(&self.target) {
                return Err(GridProcessorError::misaligned(
                    name,
                    self.target.describe(),
                    spec.describe(),
                ));
            }
        }
        Ok(())
    }
}
