use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A local package directory registered as available for linking.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegisteredPackage {
    pub path: PathBuf,
    /// Copied verbatim from the package manifest, never interpreted.
    #[serde(default = "empty_object")]
    pub autoload: serde_json::Value,
    pub registered_at: DateTime<Utc>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// Packages currently linked into one project, keyed by package name.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProjectLinkSet {
    #[serde(default)]
    pub linked_packages: BTreeMap<String, PathBuf>,
}

/// The persisted link registry.
///
/// `BTreeMap` keeps the document key order stable so it diffs cleanly.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Registry {
    #[serde(default)]
    pub registered_packages: BTreeMap<String, RegisteredPackage>,
    #[serde(default)]
    pub projects: BTreeMap<PathBuf, ProjectLinkSet>,
}

impl Registry {
    pub fn registered(&self, name: &str) -> Option<&RegisteredPackage> {
        self.registered_packages.get(name)
    }

    /// Insert or overwrite a registration. Returns the previous entry, if any.
    pub fn register(&mut self, name: &str, package: RegisteredPackage) -> Option<RegisteredPackage> {
        self.registered_packages.insert(name.to_string(), package)
    }

    pub fn linked_source(&self, project: &Path, name: &str) -> Option<&PathBuf> {
        self.projects
            .get(project)
            .and_then(|set| set.linked_packages.get(name))
    }

    pub fn record_link(&mut self, project: &Path, name: &str, source: &Path) {
        self.projects
            .entry(project.to_path_buf())
            .or_default()
            .linked_packages
            .insert(name.to_string(), source.to_path_buf());
    }

    /// Drop a link record, pruning the project entry once it is empty.
    /// Returns the source path the package was linked to.
    pub fn remove_link(&mut self, project: &Path, name: &str) -> Option<PathBuf> {
        let set = self.projects.get_mut(project)?;
        let removed = set.linked_packages.remove(name);
        if set.linked_packages.is_empty() {
            self.projects.remove(project);
        }
        removed
    }

    pub fn project_links(&self, project: &Path) -> Option<&ProjectLinkSet> {
        self.projects.get(project)
    }
}
