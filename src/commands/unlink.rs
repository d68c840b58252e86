use anyhow::Result;

use crate::application::{LinkEngine, OperationReport};
use crate::registry::RegistryStore;
use crate::runtime::Runtime;

use super::config::Config;
use super::ensure_success;

/// Remove a package link from the current project
#[tracing::instrument(skip(runtime, config))]
pub fn unlink<R: Runtime>(runtime: R, package: &str, config: Config) -> Result<()> {
    let store = RegistryStore::new(&runtime, config.state_dir.clone());
    let engine = LinkEngine::new(&runtime, &store, config.project_dir);

    let report = ensure_success(OperationReport::from(&engine.unlink(package)))?;
    println!("{}", report.message);
    Ok(())
}
