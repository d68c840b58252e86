use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

pub const MANIFEST_FILE: &str = "composer.json";

/// The parts of `composer.json` the linker cares about.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub autoload: Option<serde_json::Value>,
}

impl Manifest {
    pub fn path_in(package_dir: &Path) -> PathBuf {
        package_dir.join(MANIFEST_FILE)
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, package_dir: &Path) -> Result<Self> {
        let path = Self::path_in(package_dir);
        let content = runtime.read_to_string(&path)?;
        let manifest: Manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(manifest)
    }

    /// The package name, if present and non-blank.
    pub fn package_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub fn autoload_or_empty(&self) -> serde_json::Value {
        self.autoload
            .clone()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()))
    }
}
