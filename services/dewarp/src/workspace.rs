//! Per-run temporary working directory.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use crate::error::{DewarpError, Result};

/// Uniquely named scratch directory for intermediate grids.
///
/// Removed when dropped, on success and failure alike, unless created with
/// `keep`. Removal failures are logged, never raised.
#[derive(Debug)]
pub struct WorkingDir {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
}

impl WorkingDir {
    /// Create a new `dewarp-*` directory under the system temp dir.
    pub fn create(keep: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("dewarp-")
            .tempdir()
            .map_err(|e| DewarpError::io("failed to create working directory", e))?;
        let path = dir.path().to_path_buf();

        info!(path = %path.display(), keep, "Created working directory");
        Ok(Self {
            dir: Some(dir),
            path,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the working directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn is_kept(&self) -> bool {
        self.keep
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if self.keep {
            let path = dir.keep();
            info!(path = %path.display(), "Keeping working directory");
            return;
        }

        if let Err(e) = dir.close() {
            warn!(path = %self.path.display(), error = %e, "Failed to remove working directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let wd = WorkingDir::create(false).unwrap();
        let path = wd.path().to_path_buf();
        std::fs::write(wd.file("surf.asc"), "x").unwrap();
        assert!(path.exists());

        drop(wd);
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_when_requested() {
        let wd = WorkingDir::create(true).unwrap();
        let path = wd.path().to_path_buf();
        assert!(wd.is_kept());

        drop(wd);
        assert!(path.exists());
        std::fs::remove_dir_all(path).unwrap();
    }

    #[test]
    fn test_unique_names() {
        let a = WorkingDir::create(false).unwrap();
        let b = WorkingDir::create(false).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("dewarp-"));
    }
}
