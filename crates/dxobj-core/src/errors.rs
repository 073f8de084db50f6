use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories reported by the remote platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    ResourceNotFound,
    PermissionDenied,
    InvalidInput,
    InvalidState,
    InvalidType,
    Conflict,
    /// Set mutation named a member that is already present.
    AlreadyPresent,
    /// Set mutation named a member that is already absent.
    NotPresent,
    Unavailable,
    Internal,
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// True for codes that only report a no-op set mutation.
    pub fn is_set_noop(self) -> bool {
        matches!(self, ErrorCode::AlreadyPresent | ErrorCode::NotPresent)
    }
}

/// Platform-side failure, carried verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct RemoteError {
    pub code: ErrorCode,
    pub message: String,
    pub detail: Option<String>,
}

impl RemoteError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Rejected object identifier or project scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("object id is empty")]
    Empty,
    #[error("object id '{0}' is not of the form <class>-<suffix>")]
    Malformed(String),
    #[error("object id '{0}' belongs to a class this handler does not serve")]
    WrongClass(String),
    #[error("project scope is empty")]
    EmptyProject,
}
