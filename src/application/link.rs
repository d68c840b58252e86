//! Link engine - register, link and unlink packages.
//!
//! Linking swaps `vendor/<name>` inside the current project for a symlink to
//! the registered source directory. A real directory found there is moved to
//! `vendor/<name>.bak` and moved back on unlink. Every mutating operation
//! holds the registry lock across its load-mutate-save sequence.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info, warn};

use crate::error::LinkError;
use crate::registry::{Manifest, RegisteredPackage, Registry, RegistryStore};
use crate::runtime::{FileLock, Runtime, is_plain_relative};

/// Dependency directory inside a consuming project.
pub const VENDOR_DIR: &str = "vendor";

/// Suffix of the sibling holding the original installed package.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Result of a register operation
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterResult {
    pub name: String,
    /// Canonical package source directory
    pub path: PathBuf,
    /// Whether an earlier registration under the same name was overwritten
    pub replaced: bool,
}

impl RegisterResult {
    pub fn message(&self) -> String {
        format!("Package '{}' has been registered globally.", self.name)
    }
}

/// Result of a link operation
#[derive(Debug, Clone, PartialEq)]
pub struct LinkResult {
    pub name: String,
    /// The registered source the link points to
    pub source: PathBuf,
    /// `vendor/<name>` inside the project
    pub target: PathBuf,
    /// Where the previously installed package was moved, if there was one
    pub backup: Option<PathBuf>,
}

impl LinkResult {
    pub fn message(&self) -> String {
        format!(
            "Package '{}' has been linked to the current project.",
            self.name
        )
    }
}

/// Result of an unlink operation
#[derive(Debug, Clone, PartialEq)]
pub struct UnlinkResult {
    pub name: String,
    pub target: PathBuf,
    /// Whether a `.bak` directory was moved back into place
    pub restored_backup: bool,
}

impl UnlinkResult {
    pub fn message(&self) -> String {
        if self.restored_backup {
            format!(
                "Package '{}' has been unlinked and restored to the installed version.",
                self.name
            )
        } else {
            format!(
                "Package '{}' has been unlinked; no installed version was backed up.",
                self.name
            )
        }
    }
}

/// Performs register / link / unlink against one project.
pub struct LinkEngine<'a, R: Runtime> {
    runtime: &'a R,
    store: &'a RegistryStore<'a, R>,
    project_dir: PathBuf,
}

impl<'a, R: Runtime> LinkEngine<'a, R> {
    /// `project_dir` is the canonical root of the consuming project.
    pub fn new(runtime: &'a R, store: &'a RegistryStore<'a, R>, project_dir: PathBuf) -> Self {
        Self {
            runtime,
            store,
            project_dir,
        }
    }

    /// `<project>/vendor/<name>`
    pub fn target_path(&self, name: &str) -> PathBuf {
        let mut target = self.project_dir.join(VENDOR_DIR);
        for segment in name.split('/') {
            target.push(segment);
        }
        target
    }

    /// Register the package at `source` under the name from its manifest.
    #[tracing::instrument(skip(self))]
    pub fn register(&self, source: &Path) -> Result<RegisterResult, LinkError> {
        let invalid = |path: &Path, reason: String| LinkError::InvalidPackage {
            path: path.to_path_buf(),
            reason,
        };

        let path = self
            .runtime
            .canonicalize(source)
            .map_err(|e| invalid(source, format!("the directory does not exist ({:#})", e)))?;

        if !self.runtime.is_dir(&path) {
            return Err(invalid(&path, "it is not a directory".into()));
        }

        if !self.runtime.exists(&Manifest::path_in(&path)) {
            return Err(invalid(
                &path,
                "it does not contain a composer.json file".into(),
            ));
        }

        let manifest = Manifest::load(self.runtime, &path)
            .map_err(|e| invalid(&path, format!("{:#}", e)))?;

        let name = manifest
            .package_name()
            .ok_or_else(|| {
                invalid(
                    &path,
                    "its composer.json does not contain a 'name' property".into(),
                )
            })?
            .to_string();

        if !is_plain_relative(&name) {
            return Err(invalid(
                &path,
                format!("'{}' is not a valid vendor/package name", name),
            ));
        }

        let _lock = self.lock()?;
        let mut registry = self.load()?;

        let previous = registry.register(
            &name,
            RegisteredPackage {
                path: path.clone(),
                autoload: manifest.autoload_or_empty(),
                registered_at: self.runtime.now(),
            },
        );
        if let Some(ref previous) = previous {
            debug!(
                "Overwriting registration of {} (was {:?})",
                name, previous.path
            );
        }

        self.save(&registry)?;
        info!("Registered {} -> {:?}", name, path);

        Ok(RegisterResult {
            name,
            path,
            replaced: previous.is_some(),
        })
    }

    /// Link a registered package into the project.
    #[tracing::instrument(skip(self))]
    pub fn link(&self, name: &str) -> Result<LinkResult, LinkError> {
        self.check_name(name)?;

        let _lock = self.lock()?;
        let mut registry = self.load()?;

        let source = registry
            .registered(name)
            .ok_or_else(|| LinkError::NotRegistered {
                name: name.to_string(),
            })?
            .path
            .clone();

        if !self.runtime.exists(&source) {
            return Err(LinkError::SourceMissing {
                name: name.to_string(),
                path: source,
            });
        }

        let target = self.target_path(name);
        let backup = backup_path(&target);
        let creation_failed = |message: String, restore_error: Option<String>| {
            LinkError::LinkCreationFailed {
                name: name.to_string(),
                target: target.clone(),
                message,
                restore_error,
            }
        };

        if let Some(parent) = target.parent()
            && !self.runtime.exists(parent)
        {
            self.runtime.create_dir_all(parent).map_err(|e| {
                creation_failed(format!("cannot create {:?}: {:#}", parent, e), None)
            })?;
        }

        let mut backup_taken = false;
        if self.runtime.is_symlink(&target) {
            debug!(
                "Replacing link {:?} (was -> {:?})",
                target,
                self.runtime.read_link(&target).ok()
            );
            self.runtime
                .remove_symlink(&target)
                .map_err(|e| creation_failed(format!("cannot remove old link: {:#}", e), None))?;
        } else if self.runtime.exists(&target) {
            if self.occupied(&backup) {
                warn!("Discarding earlier backup {:?}", backup);
                self.discard(&backup).map_err(|e| {
                    creation_failed(
                        format!("cannot remove earlier backup {:?}: {:#}", backup, e),
                        None,
                    )
                })?;
            }
            debug!("Backing up {:?} to {:?}", target, backup);
            self.runtime.rename(&target, &backup).map_err(|e| {
                creation_failed(format!("cannot back up installed package: {:#}", e), None)
            })?;
            backup_taken = true;
        }

        if let Err(e) = self.runtime.symlink(&source, &target) {
            let restore_error = if backup_taken {
                self.restore_backup(&target, &backup)
                    .err()
                    .map(|re| format!("{:#}", re))
            } else {
                None
            };
            return Err(creation_failed(format!("{:#}", e), restore_error));
        }

        registry.record_link(&self.project_dir, name, &source);
        if let Err(e) = self.store.save(&registry) {
            return Err(self.roll_back_link(name, &target, backup_taken.then_some(&backup), e));
        }

        info!("Linked {} -> {:?}", name, source);
        Ok(LinkResult {
            name: name.to_string(),
            source,
            target,
            backup: backup_taken.then_some(backup),
        })
    }

    /// Remove a package link from the project and restore its backup.
    #[tracing::instrument(skip(self))]
    pub fn unlink(&self, name: &str) -> Result<UnlinkResult, LinkError> {
        let not_linked = || LinkError::NotLinked {
            name: name.to_string(),
            project: self.project_dir.clone(),
        };

        // Taking the lock creates the state directory, so a plain miss must not.
        if self.load()?.linked_source(&self.project_dir, name).is_none() {
            return Err(not_linked());
        }

        let _lock = self.lock()?;
        let mut registry = self.load()?;
        if registry.linked_source(&self.project_dir, name).is_none() {
            return Err(not_linked());
        }

        self.check_name(name)?;
        let target = self.target_path(name);
        let backup = backup_path(&target);

        if !self.occupied(&target) {
            warn!(
                "{:?} is missing, dropping the link record for {}",
                target, name
            );
            registry.remove_link(&self.project_dir, name);
            self.save(&registry)?;
            return Err(LinkError::TargetMissing {
                name: name.to_string(),
                target,
            });
        }

        if !self.runtime.is_symlink(&target) {
            warn!(
                "{:?} is not a symlink, leaving it in place and dropping the link record for {}",
                target, name
            );
            registry.remove_link(&self.project_dir, name);
            self.save(&registry)?;
            return Err(LinkError::TargetNotSymlink {
                name: name.to_string(),
                target,
            });
        }

        self.runtime
            .remove_symlink(&target)
            .map_err(|e| LinkError::LinkRemovalFailed {
                name: name.to_string(),
                target: target.clone(),
                message: format!("{:#}", e),
            })?;

        let mut restored_backup = false;
        let mut restore_error = None;
        if self.occupied(&backup) {
            debug!("Restoring {:?} to {:?}", backup, target);
            match self.runtime.rename(&backup, &target) {
                Ok(()) => restored_backup = true,
                Err(e) => restore_error = Some(format!("{:#}", e)),
            }
        }

        registry.remove_link(&self.project_dir, name);
        self.save(&registry)?;

        if let Some(message) = restore_error {
            return Err(LinkError::RestoreFailed {
                name: name.to_string(),
                backup,
                message,
            });
        }

        info!("Unlinked {}", name);
        Ok(UnlinkResult {
            name: name.to_string(),
            target,
            restored_backup,
        })
    }

    fn check_name(&self, name: &str) -> Result<(), LinkError> {
        if is_plain_relative(name) {
            Ok(())
        } else {
            Err(LinkError::InvalidPackage {
                path: PathBuf::from(name),
                reason: format!("'{}' is not a valid vendor/package name", name),
            })
        }
    }

    /// A path is occupied when anything sits there, including a dangling symlink.
    fn occupied(&self, path: &Path) -> bool {
        self.runtime.is_symlink(path) || self.runtime.exists(path)
    }

    fn discard(&self, path: &Path) -> Result<()> {
        if self.runtime.is_symlink(path) {
            self.runtime.remove_symlink(path)
        } else if self.runtime.is_dir(path) {
            self.runtime.remove_dir_all(path)
        } else {
            self.runtime.remove_file(path)
        }
    }

    fn restore_backup(&self, target: &Path, backup: &Path) -> Result<()> {
        if self.runtime.is_symlink(target) {
            self.runtime.remove_symlink(target)?;
        }
        self.runtime.rename(backup, target)
    }

    /// Undo a link whose registry record could not be written.
    fn roll_back_link(
        &self,
        name: &str,
        target: &Path,
        backup: Option<&PathBuf>,
        save_error: anyhow::Error,
    ) -> LinkError {
        let undo = match backup {
            Some(backup) => self.restore_backup(target, backup),
            None => self.runtime.remove_symlink(target),
        };

        let outcome = match undo {
            Ok(()) => "the link was rolled back".to_string(),
            Err(e) => {
                warn!("Failed to roll back link {:?}: {:#}", target, e);
                format!("rolling back the link also failed: {:#}", e)
            }
        };

        LinkError::persistence(
            format!("Failed to record the link for '{}' ({})", name, outcome),
            save_error,
        )
    }

    fn lock(&self) -> Result<FileLock, LinkError> {
        self.store
            .lock()
            .map_err(|e| LinkError::persistence("Failed to lock the link registry", e))
    }

    fn load(&self) -> Result<Registry, LinkError> {
        self.store
            .load()
            .map_err(|e| LinkError::persistence("Failed to load the link registry", e))
    }

    fn save(&self, registry: &Registry) -> Result<(), LinkError> {
        self.store
            .save(registry)
            .map_err(|e| LinkError::persistence("Failed to save the link registry", e))
    }
}

/// `vendor/acme/widget` -> `vendor/acme/widget.bak`
pub fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(BACKUP_SUFFIX);
    target.with_file_name(name)
}
