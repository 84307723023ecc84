//! Surface processing for point-cloud dewarping.
//!
//! Takes rasterized elevation surfaces, already on disk as grids, and
//! turns them into a vertical correction surface:
//!
//! ```text
//! input DSM ─────┐
//! reference DSM ─┼─► Aligner ─► ResidualField ─► fit_polynomial
//! prior map ─────┘   (first      (input - ref      (min-norm LSQ,
//!                     surface's    - prior)          tensor basis)
//!                     grid)                              │
//!                                                        ▼
//!                          EncodedCorrection ◄── PolynomialModel::evaluate_on
//!                          (shifted >= floor,            │
//!                           bias = -vcorr)               ▼
//!                                          residual_after_correction
//!                                          ─► DiagnosticRaster
//! ```
//!
//! Nothing here touches the filesystem or external tools; the `dewarp`
//! service drives those and feeds grids in.
//!
//! # Example
//!
//! ```ignore
//! use grid_processor::{fit_polynomial, Aligner, EncodedCorrection, ResampleMethod, ResidualField};
//!
//! let aligner = Aligner::from_reference(&input, ResampleMethod::Nearest);
//! let reference = aligner.align(&reference);
//!
//! let residual = ResidualField::build(&input, &reference, None)?;
//! let fit = fit_polynomial(&residual.samples(), 3, input.spec().lower_left())?;
//!
//! let correction = fit.model.evaluate_on(input.spec());
//! let encoded = EncodedCorrection::encode(&correction, 1.0)?;
//! ```

pub mod config;
pub mod correction;
pub mod diagnostics;
pub mod error;
pub mod polyfit;
pub mod resample;
pub mod residual;
pub mod types;

pub use config::ProcessingConfig;
pub use correction::{clip_extent, EncodedCorrection};
pub use diagnostics::{residual_after_correction, DiagnosticRaster, DiagnosticStats};
pub use error::{GridProcessorError, Result};
pub use polyfit::{design_matrix, fit_polynomial, PolynomialFit, PolynomialModel, MAX_ORDER};
pub use resample::Aligner;
pub use residual::{Prior, ResidualField};
pub use types::{ResampleMethod, SampleSet};
