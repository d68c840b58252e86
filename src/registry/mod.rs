//! Link registry
//!
//! The registry records which local directories are registered as linkable
//! packages and which packages are linked into which projects.

mod manifest;
mod model;
mod store;

pub use manifest::{MANIFEST_FILE, Manifest};
pub use model::{ProjectLinkSet, RegisteredPackage, Registry};
pub use store::RegistryStore;
