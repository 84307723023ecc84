//! External command execution.
//!
//! Every command is echoed through `tracing` before it runs. Nothing is
//! retried; a failing tool fails the run.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::{ToolError, ToolResult};

/// A program invocation built argument by argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Program file name, used to label errors.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// Run to completion, returning captured stdout.
    pub fn run(&self) -> ToolResult<String> {
        info!(command = %self, "Running external command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ToolError::NotFound {
                    tool: self.tool_name(),
                },
                _ => ToolError::Spawn {
                    tool: self.tool_name(),
                    source: e,
                },
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: self.tool_name(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(tool = %self.tool_name(), stdout_bytes = stdout.len(), "Command finished");
        Ok(stdout)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.display().to_string()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.contains(char::is_whitespace) {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// Fail unless `path` exists and is non-empty.
pub fn ensure_output(tool: &str, path: &Path) -> ToolResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(ToolError::missing_output(tool, path)),
    }
}

/// Fail if `path` is an empty file.
///
/// Missing files are left for the tool to report.
pub fn ensure_nonempty_input(path: &Path) -> ToolResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => Err(ToolError::EmptyInput {
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}
