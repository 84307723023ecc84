//! Error types for the dewarp service.

use std::path::{Path, PathBuf};

use dewarp_common::GridError;
use fusion_toolchain::ToolError;
use grid_processor::GridProcessorError;
use raster_io::RasterError;
use thiserror::Error;

/// Result type for dewarp runs.
pub type Result<T> = std::result::Result<T, DewarpError>;

/// Errors that abort a dewarp run.
#[derive(Error, Debug)]
pub enum DewarpError {
    /// One or more input paths do not exist.
    #[error("missing input files: {}", join_paths(.0))]
    MissingInputs(Vec<PathBuf>),

    /// Invalid configuration or arguments.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Processing(#[from] GridProcessorError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl DewarpError {
    /// Create an Io error with a description of what was attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Io error for an operation on `path`.
    pub fn io_at(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("failed to {} {}", action, path.display()), source)
    }
}
