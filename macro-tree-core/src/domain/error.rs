//! Domain Layer - Errors
//!
//! All tree failures share one error type whose `code()` is the stable
//! identifier handed to the host.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common result type for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Stable error codes surfaced to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    IdCollision,
    UnknownId,
    UnknownParent,
    ParentNotGroup,
    Cycle,
    InvalidDocument,
    InvalidId,
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IdCollision => "ID_COLLISION",
            ErrorCode::UnknownId => "UNKNOWN_ID",
            ErrorCode::UnknownParent => "UNKNOWN_PARENT",
            ErrorCode::ParentNotGroup => "PARENT_NOT_GROUP",
            ErrorCode::Cycle => "CYCLE",
            ErrorCode::InvalidDocument => "INVALID_DOCUMENT",
            ErrorCode::InvalidId => "INVALID_ID",
            ErrorCode::IoError => "IO_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tree-level errors
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Item id already present: {id}")]
    IdCollision { id: String },

    #[error("Unknown item: {id}")]
    UnknownId { id: String },

    #[error("Unknown parent: {id}")]
    UnknownParent { id: String },

    /// Instructions are leaves; only groups may hold children.
    #[error("Parent {id} is an instruction and cannot hold children")]
    ParentNotGroup { id: String },

    #[error("Moving {id} under {parent_id} would create a cycle")]
    Cycle { id: String, parent_id: String },

    #[error("Invalid document: {reason}")]
    InvalidDocument { reason: String },

    #[error("Invalid tree id: {id}")]
    InvalidId { id: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TreeError {
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        TreeError::InvalidDocument {
            reason: reason.into(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        TreeError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TreeError::IdCollision { .. } => ErrorCode::IdCollision,
            TreeError::UnknownId { .. } => ErrorCode::UnknownId,
            TreeError::UnknownParent { .. } => ErrorCode::UnknownParent,
            TreeError::ParentNotGroup { .. } => ErrorCode::ParentNotGroup,
            TreeError::Cycle { .. } => ErrorCode::Cycle,
            TreeError::InvalidDocument { .. } => ErrorCode::InvalidDocument,
            TreeError::InvalidId { .. } => ErrorCode::InvalidId,
            TreeError::Io { .. } => ErrorCode::IoError,
        }
    }

    /// The id or path the error refers to, if any
    pub fn context(&self) -> Option<String> {
        match self {
            TreeError::IdCollision { id }
            | TreeError::UnknownId { id }
            | TreeError::UnknownParent { id }
            | TreeError::ParentNotGroup { id }
            | TreeError::InvalidId { id } => Some(id.clone()),
            TreeError::Cycle { id, parent_id } => Some(format!("{id} -> {parent_id}")),
            TreeError::InvalidDocument { .. } => None,
            TreeError::Io { path, .. } => Some(path.display().to_string()),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            context: self.context(),
        }
    }
}

/// Serializable error record for the host (code + message + context)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}
