//! Registry store - persistence of the link registry document.
//!
//! The whole document is the unit of persistence: it is loaded fully, mutated
//! in memory and rewritten as a whole. Writes go to a temporary sibling first
//! and are renamed into place, so a crash never leaves a truncated document.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::paths::{lock_file, registry_file};
use crate::runtime::{FileLock, Runtime};

use super::Registry;

pub struct RegistryStore<'a, R: Runtime> {
    runtime: &'a R,
    state_dir: PathBuf,
}

impl<'a, R: Runtime> RegistryStore<'a, R> {
    pub fn new(runtime: &'a R, state_dir: PathBuf) -> Self {
        Self { runtime, state_dir }
    }

    /// The global state directory this store persists into.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// Path of the registry document (`links.json`).
    pub fn document_path(&self) -> PathBuf {
        registry_file(&self.state_dir)
    }

    /// Load the registry. A missing or blank document is the empty registry;
    /// a document that does not parse is an error.
    #[tracing::instrument(skip(self))]
    pub fn load(&self) -> Result<Registry> {
        let path = self.document_path();
        if !self.runtime.exists(&path) {
            debug!("No registry at {:?}, starting empty", path);
            return Ok(Registry::default());
        }

        let content = self
            .runtime
            .read_to_string(&path)
            .with_context(|| format!("Failed to read registry {:?}", path))?;

        if content.trim().is_empty() {
            debug!("Registry {:?} is blank, starting empty", path);
            return Ok(Registry::default());
        }

        serde_json::from_str(&content).with_context(|| {
            format!(
                "Registry {:?} is malformed; fix or remove it to continue",
                path
            )
        })
    }

    /// Serialize and atomically replace the registry document.
    #[tracing::instrument(skip(self, registry))]
    pub fn save(&self, registry: &Registry) -> Result<()> {
        self.ensure_state_dir()?;

        let path = self.document_path();
        let temp_path = self
            .state_dir
            .join(format!("links.json.{}.tmp", std::process::id()));

        let mut content = serde_json::to_string_pretty(registry)?;
        content.push('\n');

        self.runtime
            .write(&temp_path, content.as_bytes())
            .with_context(|| format!("Failed to write {:?}", temp_path))?;

        if let Err(e) = self.runtime.rename(&temp_path, &path) {
            let _ = self.runtime.remove_file(&temp_path);
            return Err(e).with_context(|| format!("Failed to replace registry {:?}", path));
        }

        debug!(
            "Saved registry with {} package(s) and {} project(s)",
            registry.registered_packages.len(),
            registry.projects.len()
        );
        Ok(())
    }

    /// Take the exclusive lock guarding a load-mutate-save sequence.
    #[tracing::instrument(skip(self))]
    pub fn lock(&self) -> Result<FileLock> {
        self.ensure_state_dir()?;
        let lock = self.runtime.lock_exclusive(&lock_file(&self.state_dir))?;
        debug!("Holding registry lock {:?}", lock.path());
        Ok(lock)
    }

    /// Recursively delete the global state directory.
    ///
    /// Returns `false` when there was nothing to delete.
    #[tracing::instrument(skip(self))]
    pub fn remove_all(&self) -> Result<bool> {
        if !self.runtime.exists(&self.state_dir) {
            debug!("State directory {:?} does not exist", self.state_dir);
            return Ok(false);
        }

        self.runtime
            .remove_dir_all(&self.state_dir)
            .with_context(|| format!("Failed to remove {:?}", self.state_dir))?;
        info!("Removed state directory {:?}", self.state_dir);
        Ok(true)
    }

    fn ensure_state_dir(&self) -> Result<()> {
        if !self.runtime.exists(&self.state_dir) {
            self.runtime
                .create_dir_all(&self.state_dir)
                .with_context(|| format!("Failed to create {:?}", self.state_dir))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use crate::test_utils::test_state_dir;
    use mockall::predicate::eq;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_document_is_empty() {
        let mut runtime = MockRuntime::new();
        let doc = test_state_dir().join("links.json");
        runtime.expect_exists().with(eq(doc)).returning(|_| false);

        let store = RegistryStore::new(&runtime, test_state_dir());
        assert_eq!(store.load().unwrap(), Registry::default());
    }

    #[test]
    fn test_load_blank_document_is_empty() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("  \n".to_string()));

        let store = RegistryStore::new(&runtime, test_state_dir());
        assert_eq!(store.load().unwrap(), Registry::default());
    }

    #[test]
    fn test_load_malformed_document_fails() {
        for bad in ["{ broken", "[1, 2, 3]", "\"just a string\""] {
            let mut runtime = MockRuntime::new();
            runtime.expect_exists().returning(|_| true);
            runtime
                .expect_read_to_string()
                .returning(move |_| Ok(bad.to_string()));

            let store = RegistryStore::new(&runtime, test_state_dir());
            let err = store.load().unwrap_err();
            assert!(format!("{:#}", err).contains("malformed"), "input {:?}", bad);
        }
    }

    #[test]
    fn test_save_writes_temp_then_renames() {
        let mut runtime = MockRuntime::new();
        let state_dir = test_state_dir();
        let doc = state_dir.join("links.json");
        let temp = state_dir.join(format!("links.json.{}.tmp", std::process::id()));

        runtime
            .expect_exists()
            .with(eq(state_dir.clone()))
            .returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(eq(state_dir.clone()))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(move |p, c| p == temp && String::from_utf8_lossy(c).contains("registered_packages"))
            .times(1)
            .returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .withf(move |_, to| to == doc)
            .times(1)
            .returning(|_, _| Ok(()));

        let store = RegistryStore::new(&runtime, state_dir);
        store.save(&Registry::default()).unwrap();
    }

    #[test]
    fn test_save_rename_failure_cleans_temp_and_propagates() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_write().returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .returning(|_, _| Err(anyhow::anyhow!("read-only file system")));
        runtime
            .expect_remove_file()
            .times(1)
            .returning(|_| Ok(()));

        let store = RegistryStore::new(&runtime, test_state_dir());
        let err = store.save(&Registry::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("read-only file system"));
    }

    #[test]
    fn test_save_write_failure_propagates() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_write()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let store = RegistryStore::new(&runtime, test_state_dir());
        assert!(store.save(&Registry::default()).is_err());
    }

    #[test]
    fn test_round_trip_on_disk() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let state_dir = dir.path().join("composer/links");
        let store = RegistryStore::new(&runtime, state_dir.clone());

        let mut registry = Registry::default();
        registry.record_link(
            &PathBuf::from("/work/app"),
            "acme/widget",
            &PathBuf::from("/src/widget"),
        );
        store.save(&registry).unwrap();

        assert!(state_dir.join("links.json").exists());
        let leftovers: Vec<_> = std::fs::read_dir(&state_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());

        assert_eq!(store.load().unwrap(), registry);
    }

    #[test]
    fn test_lock_creates_state_dir() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let state_dir = dir.path().join("composer/links");
        let store = RegistryStore::new(&runtime, state_dir.clone());

        let lock = store.lock().unwrap();
        assert!(lock.is_held());
        assert!(state_dir.join("links.lock").exists());
    }

    #[test]
    fn test_remove_all() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let state_dir = dir.path().join("composer/links");
        let store = RegistryStore::new(&runtime, state_dir.clone());

        assert!(!store.remove_all().unwrap());

        store.save(&Registry::default()).unwrap();
        assert!(store.remove_all().unwrap());
        assert!(!state_dir.exists());
    }
}
