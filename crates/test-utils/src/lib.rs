//! Shared test utilities for the dewarp workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic elevation surface generators
//! - Grid fixtures on realistic projected coordinates
//! - Scratch directory and fixture-file helpers
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, planar_surface};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Cell-wise approximate equality of two elevation grids.
///
/// Both grids must have the same number of cells; NaN cells must line up.
///
/// ```ignore
/// use test_utils::assert_grid_approx_eq;
///
/// assert_grid_approx_eq!(corrected, expected, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_grid_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left_grid = &$left;
        let right_grid = &$right;
        let left = left_grid.values();
        let right = right_grid.values();
        assert_eq!(left.len(), right.len(), "grids differ in cell count");
        for (idx, (&l, &r)) in left.iter().zip(right.iter()).enumerate() {
            if l.is_nan() || r.is_nan() {
                assert!(
                    l.is_nan() && r.is_nan(),
                    "cell {} missing in only one grid: {:?} vs {:?}",
                    idx,
                    l,
                    r
                );
                continue;
            }
            let diff = (l - r).abs();
            if diff > $epsilon as f64 {
                panic!(
                    "assertion failed: grids differ at cell {}\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`",
                    idx, l, r, diff
                );
            }
        }
    }};
}
