use dxobj_core::{IdError, RemoteError};
use dxobj_remote::CodecError;
use thiserror::Error;

/// Failures surfaced by object handle operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandleError {
    /// Handle is bound to an empty or malformed object id.
    #[error("invalid object reference: {0}")]
    InvalidReference(#[from] IdError),
    /// Platform rejected the call.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    /// Payload did not have the expected shape.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Caller-supplied payload cannot be sent.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    /// State wait ran out of time.
    #[error(
        "timed out after {waited_ms}ms waiting for {subject} to reach '{target}' (last saw '{observed}')"
    )]
    Timeout {
        subject: String,
        target: String,
        observed: String,
        waited_ms: u64,
    },
    /// State wait observed a terminal state other than the target.
    #[error("{subject} reached terminal state '{observed}' while waiting for '{target}'")]
    UnexpectedTerminalState {
        subject: String,
        target: String,
        observed: String,
    },
}

impl HandleError {
    /// Platform error code, when the failure came from the platform.
    pub fn remote_code(&self) -> Option<dxobj_core::ErrorCode> {
        match self {
            HandleError::Remote(err) => Some(err.code),
            _ => None,
        }
    }
}
