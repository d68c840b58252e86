use std::path::PathBuf;

use crate::error::{ErrorKind, LinkError};

use super::{LinkResult, RegisterResult, UnlinkResult};

/// Adapter-facing outcome of an engine operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationReport {
    pub success: bool,
    pub message: String,
    pub package: Option<String>,
    pub path: Option<PathBuf>,
    /// Set on failure
    pub kind: Option<ErrorKind>,
}

impl OperationReport {
    fn failed(err: &LinkError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            package: err.package().map(str::to_string),
            path: None,
            kind: Some(err.kind()),
        }
    }
}

impl From<&Result<RegisterResult, LinkError>> for OperationReport {
    fn from(result: &Result<RegisterResult, LinkError>) -> Self {
        match result {
            Ok(r) => Self {
                success: true,
                message: r.message(),
                package: Some(r.name.clone()),
                path: Some(r.path.clone()),
                kind: None,
            },
            Err(e) => Self::failed(e),
        }
    }
}

impl From<&Result<LinkResult, LinkError>> for OperationReport {
    fn from(result: &Result<LinkResult, LinkError>) -> Self {
        match result {
            Ok(r) => Self {
                success: true,
                message: r.message(),
                package: Some(r.name.clone()),
                path: Some(r.source.clone()),
                kind: None,
            },
            Err(e) => Self::failed(e),
        }
    }
}

impl From<&Result<UnlinkResult, LinkError>> for OperationReport {
    fn from(result: &Result<UnlinkResult, LinkError>) -> Self {
        match result {
            Ok(r) => Self {
                success: true,
                message: r.message(),
                package: Some(r.name.clone()),
                path: Some(r.target.clone()),
                kind: None,
            },
            Err(e) => Self::failed(e),
        }
    }
}
