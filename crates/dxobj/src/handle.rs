use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
    time::Duration,
};

use dxobj_core::{
    Description, IdError, ObjectId, ObjectLink, ObjectState, Operation, ProjectId, RemoteError,
    Workspace,
    protocol::{
        CloneParams, DescribeParams, ListProjectsResponse, MoveParams, PropertiesParams,
        RemoveObjectsParams, RenameParams, TagsParams, TypesParams, VisibilityParams,
    },
};
use dxobj_remote::{
    RemoteCall,
    codec::{decode, encode},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{DEFAULT_WAIT_TIMEOUT, HandleError, StateProbe, StateWaiter};

/// Which optional sections `describe` should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescribeOptions {
    pub properties: bool,
    pub details: bool,
}

/// Handle to one project's copy of a remote data object.
///
/// Two handles with the same object id but different projects share content (types, details,
/// state) while name, folder, tags, properties and visibility belong to each project's copy.
/// Cloning a handle copies its ids only.
#[derive(Clone)]
pub struct DataObject {
    object_id: ObjectId,
    project: ProjectId,
    workspace: Workspace,
    calls: Arc<dyn RemoteCall>,
    waiter: StateWaiter,
}

impl fmt::Debug for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataObject")
            .field("object_id", &self.object_id)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl DataObject {
    /// Handle scoped to the workspace project.
    pub fn new(calls: Arc<dyn RemoteCall>, workspace: &Workspace, object_id: ObjectId) -> Self {
        Self::with_project(calls, workspace, object_id, workspace.project().clone())
    }

    /// Handle scoped to an explicit project.
    pub fn with_project(
        calls: Arc<dyn RemoteCall>,
        workspace: &Workspace,
        object_id: ObjectId,
        project: ProjectId,
    ) -> Self {
        Self {
            object_id,
            project,
            workspace: workspace.clone(),
            calls,
            waiter: StateWaiter::default(),
        }
    }

    /// Replaces the waiter used by [`DataObject::wait_on_state`].
    pub fn with_waiter(mut self, waiter: StateWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Rebinds the handle; the project defaults to the workspace. No remote call is made.
    pub fn set_ids(&mut self, object_id: ObjectId, project: Option<ProjectId>) {
        self.object_id = object_id;
        self.project = project.unwrap_or_else(|| self.workspace.project().clone());
    }

    /// Object id; shared by every project's copy.
    pub fn id(&self) -> &ObjectId {
        &self.object_id
    }

    /// Project this handle reads and writes through.
    pub fn project_id(&self) -> &ProjectId {
        &self.project
    }

    /// Link to the object id alone.
    pub fn link(&self) -> ObjectLink {
        ObjectLink {
            object_id: self.object_id.clone(),
            project: None,
        }
    }

    /// Link that pins this handle's project.
    pub fn link_with_project(&self) -> ObjectLink {
        ObjectLink {
            object_id: self.object_id.clone(),
            project: Some(self.project.clone()),
        }
    }

    /// Describes the object without properties or details.
    pub fn describe(&self) -> Result<Description, HandleError> {
        self.describe_with(DescribeOptions::default())
    }

    /// Returns at least id, class, types and creation time, plus the requested sections.
    pub fn describe_with(&self, options: DescribeOptions) -> Result<Description, HandleError> {
        self.ensure_valid()?;
        let params = encode(
            Operation::Describe,
            &DescribeParams {
                project: self.project.clone(),
                properties: options.properties,
                details: options.details,
            },
        )?;
        let response = self.calls.describe(&self.object_id, params)?;
        Ok(decode(Operation::Describe, response)?)
    }

    /// Adds types to the object content. Types already present are left alone.
    pub fn add_types<I, S>(&self, types: I) -> Result<(), HandleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_valid()?;
        tracing::debug!(object_id = %self.object_id, "adding types");
        let params = encode(Operation::AddTypes, &TypesParams { types: unique(types) })?;
        tolerate_noop(
            Operation::AddTypes,
            self.calls.add_types(&self.object_id, params),
        )
    }

    /// Removes types from the object content; absent types are ignored.
    pub fn remove_types<I, S>(&self, types: I) -> Result<(), HandleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_valid()?;
        tracing::debug!(object_id = %self.object_id, "removing types");
        let params = encode(Operation::RemoveTypes, &TypesParams { types: unique(types) })?;
        tolerate_noop(
            Operation::RemoveTypes,
            self.calls.remove_types(&self.object_id, params),
        )
    }

    /// Returns the stored details (a JSON object or array).
    pub fn get_details(&self) -> Result<Value, HandleError> {
        self.ensure_valid()?;
        Ok(self.calls.get_details(&self.object_id, json!({}))?)
    }

    /// Replaces the stored details wholesale.
    pub fn set_details(&self, details: Value) -> Result<(), HandleError> {
        self.ensure_valid()?;
        if !(details.is_object() || details.is_array()) {
            return Err(HandleError::InvalidPayload(
                "details must be a JSON object or array".to_string(),
            ));
        }
        tracing::debug!(object_id = %self.object_id, "replacing details");
        self.calls.set_details(&self.object_id, details)?;
        Ok(())
    }

    /// Hides this project's copy from default listings.
    pub fn hide(&self) -> Result<(), HandleError> {
        self.set_visibility(true)
    }

    /// Reverses [`DataObject::hide`].
    pub fn unhide(&self) -> Result<(), HandleError> {
        self.set_visibility(false)
    }

    fn set_visibility(&self, hidden: bool) -> Result<(), HandleError> {
        self.ensure_valid()?;
        tracing::debug!(
            object_id = %self.object_id,
            project = %self.project,
            hidden,
            "setting visibility"
        );
        self.send(
            Operation::SetVisibility,
            &VisibilityParams {
                project: self.project.clone(),
                hidden,
            },
            |calls, id, params| calls.set_visibility(id, params),
        )
    }

    /// Renames this project's copy.
    pub fn rename(&self, name: &str) -> Result<(), HandleError> {
        self.ensure_valid()?;
        tracing::debug!(
            object_id = %self.object_id,
            project = %self.project,
            name,
            "renaming object"
        );
        self.send(
            Operation::Rename,
            &RenameParams {
                project: self.project.clone(),
                name: name.to_string(),
            },
            |calls, id, params| calls.rename(id, params),
        )
    }

    /// Sets the given properties on this project's copy, leaving others untouched.
    pub fn set_properties(&self, properties: &BTreeMap<String, String>) -> Result<(), HandleError> {
        let properties = properties
            .iter()
            .map(|(key, value)| (key.clone(), Some(value.clone())))
            .collect();
        self.write_properties(properties)
    }

    /// Deletes the named properties from this project's copy.
    pub fn remove_properties<I, S>(&self, keys: I) -> Result<(), HandleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let properties = keys.into_iter().map(|key| (key.into(), None)).collect();
        self.write_properties(properties)
    }

    fn write_properties(
        &self,
        properties: BTreeMap<String, Option<String>>,
    ) -> Result<(), HandleError> {
        self.ensure_valid()?;
        tracing::debug!(
            object_id = %self.object_id,
            project = %self.project,
            count = properties.len(),
            "writing properties"
        );
        self.send(
            Operation::SetProperties,
            &PropertiesParams {
                project: self.project.clone(),
                properties,
            },
            |calls, id, params| calls.set_properties(id, params),
        )
    }

    /// Properties of this project's copy.
    pub fn get_properties(&self) -> Result<BTreeMap<String, String>, HandleError> {
        let description = self.describe_with(DescribeOptions {
            properties: true,
            details: false,
        })?;
        Ok(description.properties.unwrap_or_default())
    }

    /// Tags this project's copy. Duplicates collapse to one tag.
    pub fn add_tags<I, S>(&self, tags: I) -> Result<(), HandleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_valid()?;
        tracing::debug!(object_id = %self.object_id, project = %self.project, "adding tags");
        let params = encode(
            Operation::AddTags,
            &TagsParams {
                project: self.project.clone(),
                tags: unique(tags),
            },
        )?;
        tolerate_noop(Operation::AddTags, self.calls.add_tags(&self.object_id, params))
    }

    /// Untags this project's copy; missing tags are not an error.
    pub fn remove_tags<I, S>(&self, tags: I) -> Result<(), HandleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_valid()?;
        tracing::debug!(object_id = %self.object_id, project = %self.project, "removing tags");
        let params = encode(
            Operation::RemoveTags,
            &TagsParams {
                project: self.project.clone(),
                tags: unique(tags),
            },
        )?;
        tolerate_noop(
            Operation::RemoveTags,
            self.calls.remove_tags(&self.object_id, params),
        )
    }

    /// Requests closing; the platform finishes asynchronously.
    pub fn close(&self) -> Result<(), HandleError> {
        self.ensure_valid()?;
        tracing::debug!(object_id = %self.object_id, "closing object");
        self.calls.close(&self.object_id, json!({}))?;
        Ok(())
    }

    /// Projects holding a copy of this object id.
    pub fn list_projects(&self) -> Result<BTreeSet<ProjectId>, HandleError> {
        self.ensure_valid()?;
        let response = self.calls.list_projects(&self.object_id, json!({}))?;
        let projects: ListProjectsResponse = decode(Operation::ListProjects, response)?;
        Ok(projects.into_projects())
    }

    /// Moves this project's copy into `destination`.
    pub fn move_to(&self, destination: &str) -> Result<(), HandleError> {
        self.ensure_valid()?;
        tracing::debug!(
            object_id = %self.object_id,
            project = %self.project,
            destination,
            "moving object"
        );
        let params = encode(
            Operation::Move,
            &MoveParams {
                objects: vec![self.object_id.clone()],
                destination: destination.to_string(),
            },
        )?;
        self.calls.move_objects(&self.project, params)?;
        Ok(())
    }

    /// Removes this project's copy. Copies in other projects are unaffected.
    pub fn remove(&self) -> Result<(), HandleError> {
        self.ensure_valid()?;
        tracing::debug!(
            object_id = %self.object_id,
            project = %self.project,
            "removing object from project"
        );
        let params = encode(
            Operation::RemoveObjects,
            &RemoveObjectsParams {
                objects: vec![self.object_id.clone()],
            },
        )?;
        self.calls.remove_objects(&self.project, params)?;
        Ok(())
    }

    /// Creates or updates a copy of the same object id in `destination_project`.
    ///
    /// Kind handlers wrap this to return their own handle type.
    pub fn clone_to(
        &self,
        destination_project: &ProjectId,
        destination_folder: &str,
    ) -> Result<DataObject, HandleError> {
        self.ensure_valid()?;
        destination_project.validate()?;
        tracing::debug!(
            object_id = %self.object_id,
            project = %self.project,
            destination_project = %destination_project,
            destination_folder,
            "cloning object"
        );
        let params = encode(
            Operation::Clone,
            &CloneParams {
                objects: vec![self.object_id.clone()],
                project: destination_project.clone(),
                destination: destination_folder.to_string(),
            },
        )?;
        self.calls.clone_objects(&self.project, params)?;

        let mut cloned = self.clone();
        cloned.project = destination_project.clone();
        Ok(cloned)
    }

    /// Blocks until the object reaches `target`, fails terminally, or `timeout` elapses.
    pub fn wait_on_state(&self, target: ObjectState, timeout: Duration) -> Result<(), HandleError> {
        self.ensure_valid()?;
        self.waiter.wait(self, target.as_str(), timeout)
    }

    /// Waits for `closed` with [`DEFAULT_WAIT_TIMEOUT`].
    pub fn wait_until_closed(&self) -> Result<(), HandleError> {
        self.wait_on_state(ObjectState::Closed, DEFAULT_WAIT_TIMEOUT)
    }

    fn ensure_valid(&self) -> Result<(), HandleError> {
        self.object_id.validate()?;
        self.project.validate()?;
        if !self.calls.accepts(&self.object_id) {
            return Err(IdError::WrongClass(self.object_id.0.clone()).into());
        }
        Ok(())
    }

    fn send<P, F>(&self, op: Operation, params: &P, call: F) -> Result<(), HandleError>
    where
        P: Serialize,
        F: FnOnce(&dyn RemoteCall, &ObjectId, Value) -> Result<Value, RemoteError>,
    {
        let params = encode(op, params)?;
        call(self.calls.as_ref(), &self.object_id, params)?;
        Ok(())
    }
}

impl StateProbe for DataObject {
    fn subject(&self) -> String {
        self.object_id.0.clone()
    }

    fn observe_state(&self) -> Result<String, HandleError> {
        let state = self.describe()?.state.ok_or_else(|| {
            HandleError::Codec(dxobj_remote::CodecError::Decode {
                operation: Operation::Describe.method(),
                message: "response carries no state".to_string(),
            })
        })?;
        Ok(state.as_str().to_string())
    }

    fn is_terminal(&self, state: &str) -> bool {
        ObjectState::parse(state).is_some_and(ObjectState::is_terminal)
    }
}

fn unique<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Set mutations are idempotent, so "already present/absent" is not a failure.
fn tolerate_noop(op: Operation, result: Result<Value, RemoteError>) -> Result<(), HandleError> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.code.is_set_noop() => {
            tracing::debug!(operation = op.method(), code = ?err.code, "set mutation was a no-op");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
