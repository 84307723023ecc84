//! Output naming and in-place replacement.
//!
//! A corrected cloud is written next to its input as
//! `<stem>_<suffix>.<ext>`. The suffix `none` (any case) replaces the input
//! instead; the point-correction tool will not overwrite a file it is
//! reading, so the input is first renamed aside:
//!
//! ```text
//! ground.laz ──rename──► ground_tmp.laz ──ClipData──► ground.laz
//!                             │
//!                 success: remove  /  failure: rename back
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{DewarpError, Result};

/// How corrected files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSuffix {
    /// Replace the input file.
    InPlace,
    /// Write `<stem>_<suffix>.<ext>` beside the input.
    Tagged(String),
}

impl OutputSuffix {
    /// Parse a command-line suffix. `none` in any case means in place.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") {
            return Ok(Self::InPlace);
        }
        if s.is_empty() {
            return Err(DewarpError::Config("output suffix must not be empty".to_string()));
        }
        if s.contains(['/', '\\']) {
            return Err(DewarpError::Config(format!(
                "output suffix '{}' must not contain path separators",
                s
            )));
        }
        Ok(Self::Tagged(s.to_string()))
    }

    pub fn is_in_place(&self) -> bool {
        matches!(self, Self::InPlace)
    }

    /// Path of the corrected version of `input`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match self {
            Self::InPlace => input.to_path_buf(),
            Self::Tagged(suffix) => with_stem_suffix(input, &format!("_{}", suffix), None),
        }
    }

    /// Path of the diagnostic difference raster for `input`.
    pub fn diff_raster_path(&self, input: &Path) -> PathBuf {
        let tag = match self {
            Self::InPlace => "_diff".to_string(),
            Self::Tagged(suffix) => format!("_{}_diff", suffix),
        };
        with_stem_suffix(input, &tag, Some("tif"))
    }
}

impl fmt::Display for OutputSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InPlace => write!(f, "none"),
            Self::Tagged(s) => write!(f, "{}", s),
        }
    }
}

/// `dir/<stem><tag>.<ext>`, keeping the original extension unless one is given.
fn with_stem_suffix(path: &Path, tag: &str, extension: Option<&str>) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = extension
        .map(str::to_string)
        .or_else(|| path.extension().map(|e| e.to_string_lossy().into_owned()));

    let name = match ext {
        Some(ext) => format!("{}{}.{}", stem, tag, ext),
        None => format!("{}{}", stem, tag),
    };
    path.with_file_name(name)
}

/// An input renamed aside so its original path can receive the output.
///
/// Dropping without [`commit`](Self::commit) restores the original file.
#[derive(Debug)]
pub struct StagedInput {
    original: PathBuf,
    staged: PathBuf,
    committed: bool,
}

impl StagedInput {
    /// Rename `path` to `<stem>_tmp.<ext>`.
    pub fn stage(path: &Path) -> Result<Self> {
        let staged = with_stem_suffix(path, "_tmp", None);
        if staged.exists() {
            return Err(DewarpError::Config(format!(
                "cannot stage {}: {} already exists",
                path.display(),
                staged.display()
            )));
        }

        fs::rename(path, &staged).map_err(|e| DewarpError::io_at("stage", path, e))?;
        debug!(original = %path.display(), staged = %staged.display(), "Staged input for in-place output");

        Ok(Self {
            original: path.to_path_buf(),
            staged,
            committed: false,
        })
    }

    /// Where the input now lives.
    pub fn staged_path(&self) -> &Path {
        &self.staged
    }

    /// Where the output must be written.
    pub fn original_path(&self) -> &Path {
        &self.original
    }

    /// Output is in place; delete the staged input.
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        fs::remove_file(&self.staged).map_err(|e| DewarpError::io_at("remove", &self.staged, e))
    }
}

impl Drop for StagedInput {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        if self.original.exists() {
            if let Err(e) = fs::remove_file(&self.original) {
                warn!(path = %self.original.display(), error = %e, "Failed to remove partial output");
            }
        }
        match fs::rename(&self.staged, &self.original) {
            Ok(()) => debug!(path = %self.original.display(), "Restored staged input"),
            Err(e) => warn!(
                staged = %self.staged.display(),
                original = %self.original.display(),
                error = %e,
                "Failed to restore staged input"
            ),
        }
    }
}
