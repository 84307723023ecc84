//! Error types for grid processing.

use dewarp_common::GridError;
use thiserror::Error;

/// Errors that can occur while aligning, fitting or encoding surfaces.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Underlying grid geometry error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A surface does not sit on the alignment grid.
    #[error("surface '{surface}' is not aligned: expected {expected}, got {actual}")]
    Misaligned {
        surface: String,
        expected: String,
        actual: String,
    },

    /// Sample coordinate and value arrays differ in length.
    #[error("sample arrays differ in length: x={x}, y={y}, z={z}")]
    SampleLengthMismatch { x: usize, y: usize, z: usize },

    /// Polynomial order outside the supported range.
    #[error("polynomial order {order} exceeds the maximum of {max}")]
    InvalidOrder { order: u32, max: u32 },

    /// Coefficient vector does not match the order.
    #[error("polynomial of order {order} needs {expected} coefficients, got {actual}")]
    CoefficientCount {
        order: u32,
        expected: usize,
        actual: usize,
    },

    /// The least-squares solver rejected the system.
    #[error("least-squares fit failed: {0}")]
    FitFailed(String),

    /// The correction surface has no cells to encode.
    #[error("correction surface is empty")]
    EmptyCorrection,

    /// The correction surface holds NaN or infinite cells.
    #[error("correction surface has {count} non-finite cells")]
    NonFiniteCorrection { count: usize },

    /// Clip margin eats the whole grid or is negative.
    #[error("invalid clip margin: {0}")]
    InvalidMargin(String),

    #[error("unknown resample method '{0}' (expected nearest or bilinear)")]
    UnknownResampleMethod(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl GridProcessorError {
    /// Create a Misaligned error from two grid descriptions.
    pub fn misaligned(
        surface: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Misaligned {
            surface: surface.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a FitFailed error.
    pub fn fit_failed(msg: impl Into<String>) -> Self {
        Self::FitFailed(msg.into())
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
