//! Error types for raster I/O.

use std::path::PathBuf;

use dewarp_common::GridError;
use thiserror::Error;

/// Result type for raster I/O operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors that can occur while reading or writing rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// File could not be opened, read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed header or value line.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Required header field absent.
    #[error("missing header field '{0}'")]
    MissingHeader(&'static str),

    /// Header declares more cells than can be addressed.
    #[error("grid dimensions {width}x{height} are too large")]
    Dimensions { width: usize, height: usize },

    /// Body holds a different number of values than the header declares.
    #[error("expected {expected} values ({width}x{height}), found {actual}")]
    ValueCount {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// Raster geometry cannot be expressed as an elevation grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl RasterError {
    /// Create an Io error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Parse error.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
