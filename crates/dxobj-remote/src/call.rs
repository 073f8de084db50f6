use dxobj_core::{ObjectId, Operation, ProjectId, RemoteError};
use serde_json::Value;

/// Generic operations every object kind exposes, each taking a pre-serialized payload.
///
/// Implementors only route `invoke`; the per-operation methods are the contract handles use.
pub trait RemoteCall: Send + Sync {
    /// Sends `params` to `op` on `target` and returns the structured result.
    fn invoke(&self, target: &str, op: Operation, params: Value) -> Result<Value, RemoteError>;

    /// Whether this implementation handles objects with the given id.
    fn accepts(&self, _object_id: &ObjectId) -> bool {
        true
    }

    fn describe(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::Describe, params)
    }

    fn add_types(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::AddTypes, params)
    }

    fn remove_types(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::RemoveTypes, params)
    }

    fn get_details(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::GetDetails, params)
    }

    fn set_details(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::SetDetails, params)
    }

    fn set_visibility(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::SetVisibility, params)
    }

    fn rename(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::Rename, params)
    }

    fn set_properties(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::SetProperties, params)
    }

    fn add_tags(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::AddTags, params)
    }

    fn remove_tags(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::RemoveTags, params)
    }

    fn close(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::Close, params)
    }

    fn list_projects(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::ListProjects, params)
    }

    fn clone_objects(&self, source: &ProjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(source.as_str(), Operation::Clone, params)
    }

    fn move_objects(&self, project: &ProjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(project.as_str(), Operation::Move, params)
    }

    fn remove_objects(&self, project: &ProjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(project.as_str(), Operation::RemoveObjects, params)
    }

    /// Creates a new object of `class`.
    fn create(&self, class: &str, params: Value) -> Result<Value, RemoteError> {
        self.invoke(class, Operation::New, params)
    }

    fn terminate(&self, object_id: &ObjectId, params: Value) -> Result<Value, RemoteError> {
        self.invoke(object_id.as_str(), Operation::Terminate, params)
    }
}
