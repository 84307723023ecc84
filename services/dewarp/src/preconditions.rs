//! Input checks performed before any side effect.

use std::path::{Path, PathBuf};

use tracing::error;

use crate::error::{DewarpError, Result};

/// Fail with every missing path at once, in the order given.
pub fn check_inputs<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Result<()> {
    let missing: Vec<PathBuf> = paths
        .into_iter()
        .filter(|p| !p.exists())
        .map(Path::to_path_buf)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    for path in &missing {
        error!(path = %path.display(), "Input does not exist");
    }
    Err(DewarpError::MissingInputs(missing))
}
