//! Error types for grid geometry.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Grid has {actual} values but its geometry needs {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid cell size {dx}x{dy}: both must be finite and positive")]
    InvalidCellSize { dx: f64, dy: f64 },

    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    #[error("Rotated or south-up geotransform is not supported: {0:?}")]
    RotatedGeotransform([f64; 6]),

    #[error("Grid geometry mismatch: expected {expected}, got {actual}")]
    GeometryMismatch { expected: String, actual: String },
}
