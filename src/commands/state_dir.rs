use anyhow::Result;

use crate::runtime::Runtime;

use super::config::Config;

/// Print the global state directory
#[tracing::instrument(skip(_runtime, config))]
pub fn state_dir<R: Runtime>(_runtime: R, config: Config) -> Result<()> {
    println!("{}", config.state_dir.display());
    Ok(())
}
