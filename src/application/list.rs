//! List queries - registered packages and links, with on-disk status.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::registry::{Registry, RegistryStore};
use crate::runtime::Runtime;

/// A globally registered package
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredEntry {
    pub name: String,
    pub path: PathBuf,
    pub registered_at: DateTime<Utc>,
    /// Whether the source directory is still on disk
    pub exists: bool,
}

/// A package linked into a project
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedEntry {
    pub name: String,
    /// The source directory the link points to
    pub path: PathBuf,
    pub exists: bool,
}

/// Read-only views over the registry. Existence is checked on every call.
pub struct ListQueries<'a, R: Runtime> {
    runtime: &'a R,
    store: &'a RegistryStore<'a, R>,
    project_dir: PathBuf,
}

impl<'a, R: Runtime> ListQueries<'a, R> {
    /// `project_dir` is the canonical root of the current project.
    pub fn new(runtime: &'a R, store: &'a RegistryStore<'a, R>, project_dir: PathBuf) -> Self {
        Self {
            runtime,
            store,
            project_dir,
        }
    }

    /// All registered packages, sorted by name
    #[tracing::instrument(skip(self))]
    pub fn list_registered(&self) -> Result<Vec<RegisteredEntry>> {
        let registry = self.store.load()?;
        Ok(registry
            .registered_packages
            .into_iter()
            .map(|(name, package)| RegisteredEntry {
                exists: self.runtime.exists(&package.path),
                name,
                path: package.path,
                registered_at: package.registered_at,
            })
            .collect())
    }

    /// Packages linked into the current project, sorted by name
    #[tracing::instrument(skip(self))]
    pub fn list_linked_in_project(&self) -> Result<Vec<LinkedEntry>> {
        let registry = self.store.load()?;
        Ok(self.entries_for(&registry, &self.project_dir))
    }

    /// Every project that has at least one link
    #[tracing::instrument(skip(self))]
    pub fn list_all_projects_with_links(&self) -> Result<BTreeMap<PathBuf, Vec<LinkedEntry>>> {
        let registry = self.store.load()?;
        Ok(registry
            .projects
            .keys()
            .map(|project| (project.clone(), self.entries_for(&registry, project)))
            .filter(|(_, entries)| !entries.is_empty())
            .collect())
    }

    fn entries_for(&self, registry: &Registry, project: &Path) -> Vec<LinkedEntry> {
        registry
            .project_links(project)
            .map(|set| {
                set.linked_packages
                    .iter()
                    .map(|(name, path)| LinkedEntry {
                        name: name.clone(),
                        path: path.clone(),
                        exists: self.runtime.exists(path),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
