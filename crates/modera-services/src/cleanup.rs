//! Local file cleanup for a single moderation run

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Deletes a local file when dropped.
///
/// A file that is already gone is not an error.
#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
}

impl TransientFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed transient file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Failed to remove transient file"
            ),
        }
    }
}

/// Fresh working directory under `work_dir`, removed with everything in it on drop
pub fn scratch_dir(work_dir: &Path) -> std::io::Result<TempDir> {
    std::fs::create_dir_all(work_dir)?;
    tempfile::Builder::new()
        .prefix("modera-")
        .tempdir_in(work_dir)
}
