//! CLI commands. Each one resolves its collaborators from [`Config`],
//! runs one engine operation or query, and renders the outcome.

use anyhow::{Result, bail};

use crate::application::OperationReport;

pub mod config;
mod link;
mod linked;
mod purge;
mod state_dir;
mod unlink;

pub use config::{Config, ConfigOverrides};
pub use link::link;
pub use linked::{LinkedScope, linked, truncate_path};
pub use purge::purge;
pub use state_dir::state_dir;
pub use unlink::unlink;

/// Turn a failed report into an error carrying its message.
fn ensure_success(report: OperationReport) -> Result<OperationReport> {
    if !report.success {
        bail!("{}", report.message);
    }
    Ok(report)
}
