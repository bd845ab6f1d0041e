//! Per-run temporary directory.
//!
//! Every run gets its own `relay-<uuid>` directory under the configured temp root, so
//! concurrent runs never see each other's files. The directory is removed by
//! [`RunWorkspace::remove`] at the end of a run, and by `Drop` if the run never got
//! that far (panic, cancelled task).

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::config::download::WORKSPACE_PREFIX;

/// Exclusively owned scratch directory for one relay run.
#[derive(Debug)]
pub struct RunWorkspace {
    path: PathBuf,
    removed: bool,
}

impl RunWorkspace {
    /// Creates a fresh uniquely named directory under `root`.
    ///
    /// `root` itself is created if missing.
    pub async fn create(root: &Path) -> std::io::Result<Self> {
        let path = root.join(format!("{}{}", WORKSPACE_PREFIX, Uuid::new_v4()));
        tokio::fs::create_dir_all(root).await?;
        // create_dir (not _all) so a colliding name fails instead of being shared
        tokio::fs::create_dir(&path).await?;
        log::debug!("Workspace created: {}", path.display());
        Ok(Self { path, removed: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory and everything in it.
    ///
    /// Best-effort: a missing directory is fine, other failures are logged and
    /// swallowed because the run's outcome has already been reported.
    pub async fn remove(mut self) {
        self.removed = true;
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => log::debug!("Workspace removed: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove workspace {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::warn!("Workspace {} removed on drop", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove workspace {} on drop: {}", self.path.display(), e),
        }
    }
}
