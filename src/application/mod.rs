//! Application layer - use cases over the link registry.
//!
//! The engine performs the mutating operations; the queries give read-only
//! views for listing.

mod link;
mod list;
mod report;

pub use link::{
    BACKUP_SUFFIX, LinkEngine, LinkResult, RegisterResult, UnlinkResult, VENDOR_DIR, backup_path,
};
pub use list::{LinkedEntry, ListQueries, RegisteredEntry};
pub use report::OperationReport;
