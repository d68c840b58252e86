//! Errors surfaced by the link engine.
//!
//! Every filesystem or parsing failure inside the engine is converted into one
//! of these variants; raw I/O errors never cross into the command layer.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`LinkError`], for adapters and tests.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    Configuration,
    InvalidPackage,
    NotRegistered,
    SourceMissing,
    NotLinked,
    TargetMissing,
    TargetNotSymlink,
    LinkCreationFailed,
    LinkRemovalFailed,
    RestoreFailed,
    PersistenceFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::InvalidPackage => "invalid-package",
            ErrorKind::NotRegistered => "not-registered",
            ErrorKind::SourceMissing => "source-missing",
            ErrorKind::NotLinked => "not-linked",
            ErrorKind::TargetMissing => "target-missing",
            ErrorKind::TargetNotSymlink => "target-not-symlink",
            ErrorKind::LinkCreationFailed => "link-creation-failed",
            ErrorKind::LinkRemovalFailed => "link-removal-failed",
            ErrorKind::RestoreFailed => "restore-failed",
            ErrorKind::PersistenceFailed => "persistence-failed",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("{0}")]
    Configuration(String),

    #[error("Package at {path:?} is not valid: {reason}")]
    InvalidPackage { path: PathBuf, reason: String },

    #[error(
        "Package '{name}' is not registered. Run 'composer-link link' in the package directory first."
    )]
    NotRegistered { name: String },

    #[error("The package directory {path:?} for '{name}' no longer exists.")]
    SourceMissing { name: String, path: PathBuf },

    #[error("Package '{name}' is not linked in project {project:?}.")]
    NotLinked { name: String, project: PathBuf },

    #[error(
        "Package directory {target:?} does not exist; removed the stale link record for '{name}'."
    )]
    TargetMissing { name: String, target: PathBuf },

    #[error(
        "{target:?} is not a symbolic link; left it in place and removed the link record for '{name}'."
    )]
    TargetNotSymlink { name: String, target: PathBuf },

    #[error(
        "Failed to create symbolic link {target:?} for '{name}': {message}{}",
        restore_suffix(.restore_error)
    )]
    LinkCreationFailed {
        name: String,
        target: PathBuf,
        message: String,
        restore_error: Option<String>,
    },

    #[error("Failed to remove symbolic link {target:?} for '{name}': {message}")]
    LinkRemovalFailed {
        name: String,
        target: PathBuf,
        message: String,
    },

    #[error("Unlinked '{name}' but could not restore the backup {backup:?}: {message}")]
    RestoreFailed {
        name: String,
        backup: PathBuf,
        message: String,
    },

    #[error("{message}")]
    PersistenceFailed { message: String },
}

fn restore_suffix(restore_error: &Option<String>) -> String {
    match restore_error {
        Some(e) => format!(" (restoring the backup also failed: {})", e),
        None => String::new(),
    }
}

impl LinkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkError::Configuration(_) => ErrorKind::Configuration,
            LinkError::InvalidPackage { .. } => ErrorKind::InvalidPackage,
            LinkError::NotRegistered { .. } => ErrorKind::NotRegistered,
            LinkError::SourceMissing { .. } => ErrorKind::SourceMissing,
            LinkError::NotLinked { .. } => ErrorKind::NotLinked,
            LinkError::TargetMissing { .. } => ErrorKind::TargetMissing,
            LinkError::TargetNotSymlink { .. } => ErrorKind::TargetNotSymlink,
            LinkError::LinkCreationFailed { .. } => ErrorKind::LinkCreationFailed,
            LinkError::LinkRemovalFailed { .. } => ErrorKind::LinkRemovalFailed,
            LinkError::RestoreFailed { .. } => ErrorKind::RestoreFailed,
            LinkError::PersistenceFailed { .. } => ErrorKind::PersistenceFailed,
        }
    }

    /// Package name the error is about, when there is one.
    pub fn package(&self) -> Option<&str> {
        match self {
            LinkError::NotRegistered { name }
            | LinkError::SourceMissing { name, .. }
            | LinkError::NotLinked { name, .. }
            | LinkError::TargetMissing { name, .. }
            | LinkError::TargetNotSymlink { name, .. }
            | LinkError::LinkCreationFailed { name, .. }
            | LinkError::LinkRemovalFailed { name, .. }
            | LinkError::RestoreFailed { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn persistence(context: impl fmt::Display, err: anyhow::Error) -> Self {
        LinkError::PersistenceFailed {
            message: format!("{}: {:#}", context, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = LinkError::NotRegistered {
            name: "acme/widget".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotRegistered);
        assert_eq!(err.package(), Some("acme/widget"));

        let err = LinkError::Configuration("no home".into());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.package(), None);
    }

    #[test]
    fn test_messages_name_the_package_and_path() {
        let err = LinkError::SourceMissing {
            name: "acme/widget".into(),
            path: PathBuf::from("/src/widget"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/src/widget"));
        assert!(msg.contains("acme/widget"));
    }

    #[test]
    fn test_link_creation_failed_reports_both_errors() {
        let err = LinkError::LinkCreationFailed {
            name: "acme/widget".into(),
            target: PathBuf::from("vendor/acme/widget"),
            message: "permission denied".into(),
            restore_error: Some("rename failed".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("permission denied"));
        assert!(msg.contains("restoring the backup also failed: rename failed"));

        let err = LinkError::LinkCreationFailed {
            name: "acme/widget".into(),
            target: PathBuf::from("vendor/acme/widget"),
            message: "permission denied".into(),
            restore_error: None,
        };
        assert!(!err.to_string().contains("restoring"));
    }

    #[test]
    fn test_persistence_includes_cause_chain() {
        let cause = anyhow::anyhow!("disk full").context("Failed to write to file");
        let err = LinkError::persistence("Failed to save registry", cause);
        assert_eq!(err.kind(), ErrorKind::PersistenceFailed);
        let msg = err.to_string();
        assert!(msg.contains("Failed to save registry"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::TargetMissing.to_string(), "target-missing");
    }
}
