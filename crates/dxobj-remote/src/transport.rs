use dxobj_core::RemoteError;
use serde_json::Value;

/// Carries one routed request to the platform and returns its JSON result.
///
/// Routes have the form `/<target>/<method>`, where the target is an object id, a project id,
/// or a class name for creation calls.
pub trait Transport: Send + Sync {
    fn request(&self, route: &str, input: Value) -> Result<Value, RemoteError>;
}
