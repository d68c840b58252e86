//! Symlink operations (create, inspect, remove).

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::symlink as unix_symlink;
            unix_symlink(original, link).context("Failed to create symlink")?;
        }
        #[cfg(windows)]
        {
            use anyhow::bail;
            use std::os::windows::fs::{symlink_dir, symlink_file};

            debug!("Creating symlink from {:?} to {:?}", link, original);

            // `is_dir()` on a relative path is relative to CWD; we want it relative to the link's parent.
            let target_path = if original.is_absolute() {
                original.to_path_buf()
            } else {
                link.parent()
                    .context("Failed to get parent directory for symlink")?
                    .join(original)
            };

            if target_path.is_dir() {
                symlink_dir(original, link).context("Failed to create directory symlink")?;
            } else {
                symlink_file(original, link).context("Failed to create file symlink")?;
            }

            if fs::symlink_metadata(link).is_err() {
                bail!(
                    "Symlink creation reported success but link does not exist: link={:?} target={:?}",
                    link,
                    original
                );
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_link_impl(&self, path: &Path) -> Result<PathBuf> {
        fs::read_link(path).context("Failed to read symlink")
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn is_symlink_impl(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> Result<()> {
        debug!("Removing symlink {:?}", path);
        #[cfg(unix)]
        {
            fs::remove_file(path).context("Failed to remove symlink")?;
        }
        #[cfg(windows)]
        {
            // Directory symlinks need remove_dir, file symlinks need remove_file.
            fs::remove_dir(path)
                .or_else(|_| fs::remove_file(path))
                .context("Failed to remove symlink")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[cfg_attr(
        skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set COMPOSER_LINK_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_real_runtime_dir_symlink_ops() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        runtime.create_dir_all(&target).unwrap();
        runtime.write(&target.join("file.txt"), b"content").unwrap();

        let link = dir.path().join("link");
        runtime.symlink(&target, &link).unwrap();
        assert!(runtime.is_symlink(&link));
        assert!(!runtime.is_symlink(&target));
        assert!(runtime.is_dir(&link));

        assert_eq!(runtime.read_link(&link).unwrap(), target);
        assert_eq!(
            runtime.read_to_string(&link.join("file.txt")).unwrap(),
            "content"
        );

        let canonical = runtime.canonicalize(&link).unwrap();
        assert!(canonical.ends_with("target"));

        runtime.remove_symlink(&link).unwrap();
        assert!(!runtime.exists(&link));
        // The target directory survives link removal
        assert!(runtime.is_dir(&target));
    }

    #[cfg_attr(
        skip_cross_windows_tests,
        ignore = "cross windows tests disabled; set COMPOSER_LINK_RUN_CROSS_WINDOWS_TESTS=1 to enable"
    )]
    #[test]
    fn test_dangling_symlink_is_symlink_but_not_exists() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("gone");
        runtime.create_dir_all(&target).unwrap();

        let link = dir.path().join("link");
        runtime.symlink(&target, &link).unwrap();
        runtime.remove_dir_all(&target).unwrap();

        assert!(runtime.is_symlink(&link));
        assert!(!runtime.exists(&link));

        runtime.remove_symlink(&link).unwrap();
        assert!(!runtime.is_symlink(&link));
    }

    #[test]
    fn test_symlink_onto_existing_path_fails() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        let occupied = dir.path().join("occupied");
        runtime.create_dir_all(&target).unwrap();
        runtime.create_dir_all(&occupied).unwrap();

        assert!(runtime.symlink(&target, &occupied).is_err());
    }

    #[test]
    fn test_is_symlink_missing_path() {
        let runtime = RealRuntime;
        assert!(!runtime.is_symlink(std::path::Path::new("/nonexistent/link")));
    }
}
