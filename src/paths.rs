use log::debug;
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::runtime::Runtime;

/// Sub-path appended to `$XDG_DATA_HOME`.
const XDG_SUBPATH: &str = "composer/links";

/// Sub-path appended to the home directory.
const HOME_SUBPATH: &str = ".composer/links";

/// Resolve the global state directory holding the link registry.
///
/// Uses `$XDG_DATA_HOME/composer/links` when `XDG_DATA_HOME` is set to an
/// absolute path, otherwise `<home>/.composer/links`, where home is `HOME`,
/// then `HOMEDRIVE`+`HOMEPATH`, then the platform home directory.
#[tracing::instrument(skip(runtime))]
pub fn global_state_dir<R: Runtime>(runtime: &R) -> Result<PathBuf, LinkError> {
    if let Some(base) = non_empty_var(runtime, "XDG_DATA_HOME") {
        let base = PathBuf::from(base.trim_end_matches(['/', '\\']));
        if base.is_absolute() {
            debug!("Using XDG_DATA_HOME {:?}", base);
            return Ok(base.join(XDG_SUBPATH));
        }
        debug!("Ignoring relative XDG_DATA_HOME {:?}", base);
    }

    let home = home_base(runtime).ok_or_else(|| {
        LinkError::Configuration(
            "Could not determine the global state directory: neither XDG_DATA_HOME nor a home directory is available".into(),
        )
    })?;

    if !home.is_absolute() {
        return Err(LinkError::Configuration(format!(
            "Home directory {:?} is not an absolute path",
            home
        )));
    }

    Ok(home.join(HOME_SUBPATH))
}

fn home_base<R: Runtime>(runtime: &R) -> Option<PathBuf> {
    if let Some(home) = non_empty_var(runtime, "HOME") {
        return Some(PathBuf::from(home));
    }

    if let (Some(drive), Some(path)) = (
        non_empty_var(runtime, "HOMEDRIVE"),
        non_empty_var(runtime, "HOMEPATH"),
    ) {
        return Some(PathBuf::from(format!("{}{}", drive, path)));
    }

    runtime.home_dir()
}

fn non_empty_var<R: Runtime>(runtime: &R, key: &str) -> Option<String> {
    runtime.env_var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Registry document inside the state directory.
pub fn registry_file(state_dir: &Path) -> PathBuf {
    state_dir.join("links.json")
}

/// Lock file guarding load-mutate-save of the registry document.
pub fn lock_file(state_dir: &Path) -> PathBuf {
    state_dir.join("links.lock")
}
