//! Per-job scratch directory.

use crate::bundler::{Result, error::ErrorExt, utils::fs};
use std::path::{Path, PathBuf};

/// Prefix of every work directory name.
pub const WORK_DIR_PREFIX: &str = "newtabtheme-";

/// Uniquely named directory under the system temp dir, removed when the job
/// ends.
///
/// Call [`WorkDir::close`] to remove it and observe failures. If the guard is
/// dropped without closing (panic, cancelled future) the directory is removed
/// synchronously on a best-effort basis.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    closed: bool,
}

impl WorkDir {
    /// Creates `newtabtheme-<uuid>` under [`std::env::temp_dir`].
    pub async fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir()).await
    }

    /// Creates `newtabtheme-<uuid>` under `parent`.
    pub async fn create_in(parent: &Path) -> Result<Self> {
        let path = parent.join(format!("{}{}", WORK_DIR_PREFIX, uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&path)
            .await
            .fs_context("creating work directory", &path)?;
        log::debug!("Created work directory {}", path.display());
        Ok(Self {
            path,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `name` inside the work directory.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Removes the directory and everything in it.
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;
        fs::remove_dir_all(&self.path).await?;
        log::debug!("Removed work directory {}", self.path.display());
        Ok(())
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove work directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
