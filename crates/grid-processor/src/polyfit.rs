//! Two-dimensional polynomial surface fitting.
//!
//! Models a smooth warp as a full tensor-product polynomial:
//!
//! ```text
//! f(x, y) = Σ c_ij · x^i · y^j      for i, j in 0..=order
//! ```
//!
//! which has `(order + 1)^2` terms. Coefficients are stored with `i` as the
//! outer index and `j` as the inner one, so `c_ij` sits at
//! `i * (order + 1) + j`.
//!
//! Fitting happens in local coordinates: sample positions are shifted so
//! that the grid's lower-left corner is the origin. Projected coordinates
//! in the hundreds of kilometers would otherwise make the higher powers
//! swamp the constant column. The model remembers its origin, so
//! [`PolynomialModel::evaluate`] takes map coordinates directly.
//!
//! The system `G·c ≈ z` is solved with an SVD pseudo-inverse, which gives
//! the minimum-norm least-squares solution. Rank-deficient systems (too few
//! samples, collinear samples) therefore still produce coefficients; they
//! are logged as a warning instead of failing the run.

use dewarp_common::{ElevationGrid, GridSpec};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::error::{GridProcessorError, Result};
use crate::types::SampleSet;

/// Highest polynomial order accepted by the fitter.
///
/// Order 12 already means 169 terms; beyond that the basis is numerically
/// meaningless for terrain-scale grids.
pub const MAX_ORDER: u32 = 12;

/// A fitted 2D polynomial in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialModel {
    order: u32,
    origin: (f64, f64),
    coefficients: Vec<f64>,
}

impl PolynomialModel {
    /// Number of terms in a full tensor-product basis of `order`.
    pub fn term_count(order: u32) -> usize {
        let n = order as usize + 1;
        n * n
    }

    /// A model whose every coefficient is zero.
    pub fn zero(order: u32, origin: (f64, f64)) -> Self {
        Self {
            order,
            origin,
            coefficients: vec![0.0; Self::term_count(order)],
        }
    }

    /// Build a model from known coefficients (`i`-major order).
    pub fn from_coefficients(order: u32, origin: (f64, f64), coefficients: Vec<f64>) -> Result<Self> {
        let expected = Self::term_count(order);
        if coefficients.len() != expected {
            return Err(GridProcessorError::CoefficientCount {
                order,
                expected,
                actual: coefficients.len(),
            });
        }
        Ok(Self {
            order,
            origin,
            coefficients,
        })
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    /// Map coordinate treated as (0, 0) by the polynomial.
    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of the `x^i · y^j` term, or 0 outside the basis.
    pub fn coefficient(&self, i: u32, j: u32) -> f64 {
        if i > self.order || j > self.order {
            return 0.0;
        }
        self.coefficients[(i * (self.order + 1) + j) as usize]
    }

    /// Evaluate the polynomial at a map coordinate.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let xp = powers(x - self.origin.0, self.order);
        let yp = powers(y - self.origin.1, self.order);
        let n = self.order as usize + 1;

        let mut z = 0.0;
        for (i, xi) in xp.iter().enumerate() {
            for (j, yj) in yp.iter().enumerate() {
                z += self.coefficients[i * n + j] * xi * yj;
            }
        }
        z
    }

    /// Evaluate the polynomial at every cell center of `spec`.
    ///
    /// The result has no missing cells: the model extrapolates over gaps
    /// and edges where no residual was observed.
    pub fn evaluate_on(&self, spec: &GridSpec) -> ElevationGrid {
        ElevationGrid::from_fn(*spec, |x, y| self.evaluate(x, y))
    }
}

/// Outcome of a least-squares fit.
#[derive(Debug, Clone)]
pub struct PolynomialFit {
    pub model: PolynomialModel,
    /// Number of samples (design matrix rows) used.
    pub sample_count: usize,
    /// Numerical rank of the design matrix.
    pub rank: usize,
    /// Root-mean-square of `z - f(x, y)` over the samples; NaN with no samples.
    pub rms_residual: f64,
}

impl PolynomialFit {
    /// True when the design matrix had full column rank.
    pub fn is_full_rank(&self) -> bool {
        self.rank == PolynomialModel::term_count(self.model.order())
    }
}

/// `[1, v, v^2, ..., v^order]`
fn powers(v: f64, order: u32) -> Vec<f64> {
    let mut out = Vec::with_capacity(order as usize + 1);
    let mut p = 1.0;
    for _ in 0..=order {
        out.push(p);
        p *= v;
    }
    out
}

/// Build the design matrix `G` with one row per sample and columns
/// `x^i · y^j` in `i`-major order, in coordinates relative to `origin`.
pub fn design_matrix(samples: &SampleSet, order: u32, origin: (f64, f64)) -> DMatrix<f64> {
    let n = order as usize + 1;
    let mut g = DMatrix::<f64>::zeros(samples.len(), n * n);

    for (row, (x, y, _)) in samples.iter().enumerate() {
        let xp = powers(x - origin.0, order);
        let yp = powers(y - origin.1, order);
        for (i, xi) in xp.iter().enumerate() {
            for (j, yj) in yp.iter().enumerate() {
                g[(row, i * n + j)] = xi * yj;
            }
        }
    }
    g
}

/// Fit a polynomial of `order` to `samples` by minimum-norm least squares.
///
/// `origin` is the map coordinate used as the local (0, 0); pass the grid's
/// lower-left corner. An empty sample set yields the zero model.
pub fn fit_polynomial(samples: &SampleSet, order: u32, origin: (f64, f64)) -> Result<PolynomialFit> {
    if order > MAX_ORDER {
        return Err(GridProcessorError::InvalidOrder {
            order,
            max: MAX_ORDER,
        });
    }

    let terms = PolynomialModel::term_count(order);
    let n = samples.len();

    if n == 0 {
        warn!(
            order,
            terms, "No valid residual samples; using a zero correction model"
        );
        return Ok(PolynomialFit {
            model: PolynomialModel::zero(order, origin),
            sample_count: 0,
            rank: 0,
            rms_residual: f64::NAN,
        });
    }

    if n < terms {
        warn!(
            samples = n,
            terms, "Fewer residual samples than polynomial terms; fit is underdetermined"
        );
    }

    let mut g = design_matrix(samples, order, origin);

    // Equilibrate columns so the SVD tolerance is not dominated by the
    // highest-power column; coefficients are rescaled after the solve.
    let scales: Vec<f64> = (0..terms)
        .map(|c| {
            let norm = g.column(c).norm();
            if norm > 0.0 && norm.is_finite() {
                norm
            } else {
                1.0
            }
        })
        .collect();
    for (c, &s) in scales.iter().enumerate() {
        g.column_mut(c).unscale_mut(s);
    }

    let z = DVector::from_column_slice(samples.z());
    let svd = g.clone().svd(true, true);

    let max_singular = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let tolerance = max_singular * n.max(terms) as f64 * f64::EPSILON;
    let rank = svd.rank(tolerance);

    let scaled = svd
        .solve(&z, tolerance)
        .map_err(GridProcessorError::fit_failed)?;

    let rms_residual = ((&g * &scaled - &z).norm_squared() / n as f64).sqrt();

    let coefficients: Vec<f64> = scaled
        .iter()
        .zip(&scales)
        .map(|(c, s)| c / s)
        .collect();

    if rank < terms && n >= terms {
        warn!(rank, terms, "Design matrix is rank deficient; using minimum-norm solution");
    }

    debug!(
        order,
        samples = n,
        rank,
        rms_residual,
        coefficients = ?coefficients,
        "Fitted polynomial surface"
    );

    Ok(PolynomialFit {
        model: PolynomialModel::from_coefficients(order, origin, coefficients)?,
        sample_count: n,
        rank,
        rms_residual,
    })
}
