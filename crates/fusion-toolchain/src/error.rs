//! Error types for external tool execution.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for toolchain operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors raised while running external point-cloud and raster tools.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Executable is not installed or not on PATH.
    #[error("tool '{tool}' not found; is it installed and on PATH?")]
    NotFound { tool: String },

    /// Process could not be started for another reason.
    #[error("failed to start '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool ran and rejected its input.
    #[error("'{tool}' exited with {}: {stderr}", status_text(.code))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Tool reported success but left no (or an empty) output file.
    #[error("'{tool}' produced no output at {}", .path.display())]
    MissingOutput { tool: String, path: PathBuf },

    /// Input file is empty and cannot be processed.
    #[error("input {} is empty", .path.display())]
    EmptyInput { path: PathBuf },

    /// Invalid tool configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl ToolError {
    /// Create a MissingOutput error.
    pub fn missing_output(tool: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingOutput {
            tool: tool.into(),
            path: path.into(),
        }
    }

    /// True when the tool itself could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
