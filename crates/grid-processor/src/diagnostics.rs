//! Post-correction difference raster.
//!
//! Reports how far the corrected input surface still sits from the
//! reference, cell by cell, in the diagnostic unit. Missing cells carry a
//! fixed nodata sentinel so the raster can be written to formats without
//! NaN support.

use dewarp_common::ElevationGrid;
use tracing::debug;

use crate::error::Result;

/// `(input - correction) - reference` on the shared alignment grid.
///
/// `correction` is the unshifted correction surface, so the result is what
/// the reference comparison would show after the points were corrected.
pub fn residual_after_correction(
    input: &ElevationGrid,
    correction: &ElevationGrid,
    reference: &ElevationGrid,
) -> Result<ElevationGrid> {
    let corrected = input.zip_map(correction, |z, c| z - c)?;
    Ok(corrected.zip_map(reference, |z, r| z - r)?)
}

/// Summary statistics over the valid cells of a diagnostic raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticStats {
    pub valid_cells: usize,
    pub mean: f64,
    pub rms: f64,
    pub min: f64,
    pub max: f64,
}

/// Diagnostic difference raster, scaled and with missing cells filled.
#[derive(Debug, Clone)]
pub struct DiagnosticRaster {
    grid: ElevationGrid,
    nodata: f64,
    stats: Option<DiagnosticStats>,
}

impl DiagnosticRaster {
    /// Scale `difference` by `factor` and replace missing cells by `nodata`.
    pub fn encode(difference: &ElevationGrid, factor: f64, nodata: f64) -> Self {
        let scaled = difference.map(|v| v * factor);
        let stats = compute_stats(&scaled);

        if let Some(s) = &stats {
            debug!(
                valid_cells = s.valid_cells,
                mean = s.mean,
                rms = s.rms,
                "Encoded diagnostic difference raster"
            );
        }

        let grid = scaled.map(|v| if v.is_finite() { v } else { nodata });
        Self {
            grid,
            nodata,
            stats,
        }
    }

    pub fn grid(&self) -> &ElevationGrid {
        &self.grid
    }

    pub fn into_grid(self) -> ElevationGrid {
        self.grid
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// Statistics over valid cells; `None` when every cell was missing.
    pub fn stats(&self) -> Option<DiagnosticStats> {
        self.stats
    }
}

fn compute_stats(grid: &ElevationGrid) -> Option<DiagnosticStats> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for &v in grid.values().iter().filter(|v| v.is_finite()) {
        count += 1;
        sum += v;
        sum_sq += v * v;
        min = min.min(v);
        max = max.max(v);
    }

    if count == 0 {
        return None;
    }

    let n = count as f64;
    Some(DiagnosticStats {
        valid_cells: count,
        mean: sum / n,
        rms: (sum_sq / n).sqrt(),
        min,
        max,
    })
}
