use thiserror::Error;

/// Payload conversion failures between typed values and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Request parameters could not be encoded.
    #[error("failed to encode {operation} params: {message}")]
    Encode {
        operation: &'static str,
        message: String,
    },
    /// Response did not match the expected shape.
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}
