use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum AclError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("children exist: {0}")]
    ChildrenExist(String),

    #[error("sid not loaded: {0}")]
    SidUnloaded(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("no matching entry: {0}")]
    NoMatchingEntry(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for AclError {
    fn from(err: serde_json::Error) -> Self {
        AclError::Configuration(err.to_string())
    }
}
