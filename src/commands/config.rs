use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::paths::global_state_dir;
use crate::runtime::{Runtime, normalize_path};

/// Values supplied on the command line that take precedence over discovery.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Global state directory (`--state-dir`)
    pub state_dir: Option<PathBuf>,
}

/// Resolved settings shared by every command.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `links.json`
    pub state_dir: PathBuf,
    /// Canonical path of the current project
    pub project_dir: PathBuf,
}

impl Config {
    /// Resolve settings from overrides, the environment and the current directory.
    pub fn load<R: Runtime>(runtime: &R, overrides: ConfigOverrides) -> Result<Self> {
        let cwd = runtime.current_dir()?;
        let project_dir = runtime
            .canonicalize(&cwd)
            .with_context(|| format!("Failed to resolve the current directory {:?}", cwd))?;

        let state_dir = match overrides.state_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => normalize_path(&project_dir.join(dir)),
            None => global_state_dir(runtime)?,
        };

        debug!(
            "Using state directory {:?}, project {:?}",
            state_dir, project_dir
        );
        Ok(Self {
            state_dir,
            project_dir,
        })
    }

    #[cfg(test)]
    pub fn for_test(state_dir: PathBuf, project_dir: PathBuf) -> Self {
        Self {
            state_dir,
            project_dir,
        }
    }
}
