//! Scratch directories and fixture files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the test-utils manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Fresh temporary directory, removed when dropped.
pub fn scratch_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("dewarp-test-")
        .tempdir()
        .expect("failed to create scratch directory")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write fixture file");
    path
}

/// Create a placeholder point-cloud file; the content is never parsed.
pub fn touch_cloud(dir: &Path, name: &str) -> PathBuf {
    write_fixture(dir, name, "LASF")
}
