use anyhow::{Result, bail};
use log::debug;
use std::path::Path;

use crate::application::{LinkEngine, OperationReport};
use crate::registry::RegistryStore;
use crate::runtime::Runtime;

use super::config::Config;
use super::ensure_success;

/// Register a package directory, or link a registered package into the project.
///
/// With no argument the current directory is registered. An existing directory
/// is registered; a `vendor/package` name is linked.
#[tracing::instrument(skip(runtime, config))]
pub fn link<R: Runtime>(runtime: R, path_or_name: Option<&str>, config: Config) -> Result<()> {
    let store = RegistryStore::new(&runtime, config.state_dir.clone());
    let engine = LinkEngine::new(&runtime, &store, config.project_dir.clone());

    let Some(arg) = path_or_name.filter(|a| !a.is_empty()) else {
        return register(&engine, &config.project_dir);
    };

    let candidate = config.project_dir.join(arg);
    if runtime.is_dir(&candidate) {
        debug!("{:?} is a directory, registering it", candidate);
        return register(&engine, &candidate);
    }

    if arg.contains('/') {
        let report = ensure_success(OperationReport::from(&engine.link(arg)))?;
        println!("{}", report.message);
        if let Some(path) = report.path {
            println!("Package path: {}", path.display());
        }
        return Ok(());
    }

    bail!(
        "Invalid argument '{}'. Please provide a valid directory path or package name.",
        arg
    )
}

fn register<R: Runtime>(engine: &LinkEngine<'_, R>, dir: &Path) -> Result<()> {
    let report = ensure_success(OperationReport::from(&engine.register(dir)))?;
    println!("{}", report.message);
    println!();
    println!("To use this package in another project, run:");
    println!(
        "  composer-link link {}",
        report.package.as_deref().unwrap_or_default()
    );
    Ok(())
}
