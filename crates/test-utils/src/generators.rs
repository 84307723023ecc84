//! Synthetic elevation surfaces.
//!
//! These generators create predictable, verifiable surfaces that stand in
//! for rasterized point clouds across the test suite. Polynomial surfaces
//! use the same local origin as the fitter (the grid's lower-left corner),
//! so a fit can be checked coefficient by coefficient.

use dewarp_common::{ElevationGrid, GridSpec};

/// Every cell set to `value`.
pub fn constant_surface(spec: GridSpec, value: f64) -> ElevationGrid {
    ElevationGrid::filled(spec, value)
}

/// `z = c + a·x + b·y` in coordinates local to the lower-left corner.
pub fn planar_surface(spec: GridSpec, a: f64, b: f64, c: f64) -> ElevationGrid {
    let (x0, y0) = spec.lower_left();
    ElevationGrid::from_fn(spec, |x, y| c + a * (x - x0) + b * (y - y0))
}

/// Full tensor-product polynomial surface.
///
/// `coefficients[i * (order + 1) + j]` multiplies `x^i · y^j`, with `x`
/// and `y` local to the lower-left corner.
///
/// # Panics
///
/// Panics if `coefficients` does not hold `(order + 1)^2` values.
pub fn polynomial_surface(spec: GridSpec, order: u32, coefficients: &[f64]) -> ElevationGrid {
    let n = order as usize + 1;
    assert_eq!(coefficients.len(), n * n, "wrong coefficient count for order {}", order);

    let (x0, y0) = spec.lower_left();
    ElevationGrid::from_fn(spec, |x, y| {
        let (lx, ly) = (x - x0, y - y0);
        let mut z = 0.0;
        for i in 0..n {
            for j in 0..n {
                z += coefficients[i * n + j] * lx.powi(i as i32) * ly.powi(j as i32);
            }
        }
        z
    })
}

/// Rolling terrain: a few superposed sine waves on a base elevation.
///
/// Deterministic, smooth and not representable by a low-order polynomial,
/// which makes it a reasonable stand-in for real ground.
pub fn terrain_surface(spec: GridSpec, base: f64) -> ElevationGrid {
    let (x0, y0) = spec.lower_left();
    ElevationGrid::from_fn(spec, |x, y| {
        let (lx, ly) = (x - x0, y - y0);
        base + 3.0 * (lx / 17.0).sin() + 2.0 * (ly / 11.0).cos() + 0.5 * ((lx + ly) / 5.0).sin()
    })
}

/// Mark every `stride`-th cell (row-major, starting at `offset`) missing.
pub fn with_holes(grid: &ElevationGrid, stride: usize, offset: usize) -> ElevationGrid {
    let mut out = grid.clone();
    let width = grid.width();
    let stride = stride.max(1);
    for idx in (offset..grid.spec().len()).step_by(stride) {
        out.set(idx % width, idx / width, f64::NAN);
    }
    out
}

/// Mark a rectangular block of cells missing (column and row ranges).
pub fn with_missing_block(
    grid: &ElevationGrid,
    cols: std::ops::Range<usize>,
    rows: std::ops::Range<usize>,
) -> ElevationGrid {
    let mut out = grid.clone();
    for row in rows {
        for col in cols.clone() {
            out.set(col, row, f64::NAN);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::small_spec;

    #[test]
    fn test_planar_surface_origin() {
        let grid = planar_surface(small_spec(), 2.0, 3.0, 5.0);
        // First cell is the top-left; its center is (0.5, 2.5) locally
        assert_eq!(grid.get(0, 0), Some(5.0 + 1.0 + 7.5));
    }

    #[test]
    fn test_polynomial_matches_planar() {
        let spec = small_spec();
        let poly = polynomial_surface(spec, 1, &[5.0, 3.0, 2.0, 0.0]);
        assert_eq!(poly, planar_surface(spec, 2.0, 3.0, 5.0));
    }

    #[test]
    fn test_with_holes() {
        let grid = with_holes(&constant_surface(small_spec(), 1.0), 2, 0);
        assert_eq!(grid.valid_count(), 6);
        assert!(grid.get(0, 0).unwrap().is_nan());
        assert_eq!(grid.get(1, 0), Some(1.0));
    }

    #[test]
    fn test_with_missing_block() {
        let grid = with_missing_block(&constant_surface(small_spec(), 1.0), 0..2, 1..3);
        assert_eq!(grid.valid_count(), 8);
    }
}
