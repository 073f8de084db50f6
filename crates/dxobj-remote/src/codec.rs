use dxobj_core::Operation;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::CodecError;

/// Serializes typed parameters into the structured payload sent with `op`.
pub fn encode<T: Serialize>(op: Operation, value: &T) -> Result<Value, CodecError> {
    serde_json::to_value(value).map_err(|err| CodecError::Encode {
        operation: op.method(),
        message: err.to_string(),
    })
}

/// Deserializes the structured result of `op` into a typed value.
pub fn decode<T: DeserializeOwned>(op: Operation, value: Value) -> Result<T, CodecError> {
    serde_json::from_value(value).map_err(|err| CodecError::Decode {
        operation: op.method(),
        message: err.to_string(),
    })
}
