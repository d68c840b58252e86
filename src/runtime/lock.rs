//! Advisory file locks.

use anyhow::{Context, Result};
use fs2::FileExt;
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::RealRuntime;

/// Guard for an exclusive advisory lock. The lock is released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: Option<File>,
    path: PathBuf,
}

impl FileLock {
    /// A guard that holds no OS lock, for runtimes that do not touch the disk.
    pub fn detached(path: &Path) -> Self {
        Self {
            file: None,
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            debug!("Releasing lock {:?}", self.path);
            if let Err(e) = FileExt::unlock(&file) {
                warn!("Failed to release lock {:?}: {}", self.path, e);
            }
        }
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn lock_exclusive_impl(&self, path: &Path) -> Result<FileLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open lock file {:?}", path))?;

        debug!("Waiting for lock {:?}", path);
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {:?}", path))?;

        Ok(FileLock {
            file: Some(file),
            path: path.to_path_buf(),
        })
    }
}
