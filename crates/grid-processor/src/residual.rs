//! Residual fields between aligned surfaces.
//!
//! `residual = input - (reference + prior * prior_factor)`
//!
//! where the prior term is present only when an auxiliary difference map
//! is supplied and `prior_factor` converts the prior's unit into the
//! surface unit. A cell missing in any contributing grid stays missing
//! and never reaches the fit.

use dewarp_common::ElevationGrid;

use crate::error::Result;
use crate::types::SampleSet;

/// Auxiliary prior added onto the reference before differencing.
#[derive(Debug, Clone, Copy)]
pub struct Prior<'a> {
    pub grid: &'a ElevationGrid,
    /// Multiplier taking prior values into the surface unit.
    pub factor: f64,
}

/// Cell-wise elevation difference between two aligned surfaces.
#[derive(Debug, Clone)]
pub struct ResidualField {
    grid: ElevationGrid,
}

impl ResidualField {
    /// Difference `input` against `reference`, optionally offset by a prior.
    ///
    /// All grids must already share the same pixel geometry.
    pub fn build(
        input: &ElevationGrid,
        reference: &ElevationGrid,
        prior: Option<Prior<'_>>,
    ) -> Result<Self> {
        let target = match prior {
            Some(Prior { grid, factor }) => reference.zip_map(grid, |r, p| r + p * factor)?,
            None => reference.clone(),
        };

        let grid = input.zip_map(&target, |a, b| {
            let d = a - b;
            if d.is_finite() {
                d
            } else {
                f64::NAN
            }
        })?;

        Ok(Self { grid })
    }

    pub fn grid(&self) -> &ElevationGrid {
        &self.grid
    }

    /// Number of observed (non-missing) cells.
    pub fn valid_count(&self) -> usize {
        self.grid.valid_count()
    }

    /// Observed cells as `(x, y, residual)` samples at cell centers.
    ///
    /// Missing cells are dropped, not filled.
    pub fn samples(&self) -> SampleSet {
        let mut samples = SampleSet::with_capacity(self.valid_count());
        for (x, y, z) in self.grid.cells() {
            if z.is_finite() {
                samples.push(x, y, z);
            }
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dewarp_common::{BoundingBox, EpsgCode, GridSpec};

    fn spec() -> GridSpec {
        GridSpec::from_extent(
            BoundingBox::new(0.0, 0.0, 3.0, 2.0),
            1.0,
            1.0,
            EpsgCode::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_plain_difference() {
        let input = ElevationGrid::filled(spec(), 10.5);
        let reference = ElevationGrid::filled(spec(), 10.0);

        let residual = ResidualField::build(&input, &reference, None).unwrap();

        assert_eq!(residual.valid_count(), 6);
        assert!(residual.grid().values().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_prior_in_centimeters() {
        let input = ElevationGrid::filled(spec(), 101.0);
        let reference = ElevationGrid::filled(spec(), 100.0);
        // 80 cm of snow on the reference surface
        let snow = ElevationGrid::filled(spec(), 80.0);

        let residual = ResidualField::build(
            &input,
            &reference,
            Some(Prior {
                grid: &snow,
                factor: 0.01,
            }),
        )
        .unwrap();

        for &v in residual.grid().values() {
            assert!((v - 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_in_any_grid_is_excluded() {
        let mut input = ElevationGrid::filled(spec(), 1.0);
        let mut reference = ElevationGrid::filled(spec(), 0.0);
        let mut prior = ElevationGrid::filled(spec(), 0.0);
        input.set(0, 0, f64::NAN);
        reference.set(1, 0, f64::NAN);
        prior.set(2, 0, f64::NAN);

        let residual = ResidualField::build(
            &input,
            &reference,
            Some(Prior {
                grid: &prior,
                factor: 0.01,
            }),
        )
        .unwrap();
        let samples = residual.samples();

        assert_eq!(residual.valid_count(), 3);
        assert_eq!(samples.len(), 3);
        // Only the bottom row survives
        assert!(samples.y().iter().all(|&y| y == 0.5));
        assert_eq!(samples.x(), &[0.5, 1.5, 2.5]);
    }
}
