use std::{collections::BTreeMap, ops::Deref, sync::Arc};

use dxobj_core::{
    ObjectId, ObjectKind, Operation, ProjectId, Workspace,
    protocol::{CreatedResponse, NewObjectParams},
};
use dxobj_remote::{
    RemoteCall,
    codec::{decode, encode},
};
use serde_json::Value;

use crate::{DataObject, HandleError};

/// Initial metadata for a new record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecord {
    /// Defaults to the workspace project.
    pub project: Option<ProjectId>,
    pub name: Option<String>,
    pub folder: Option<String>,
    pub types: Vec<String>,
    pub tags: Vec<String>,
    pub properties: BTreeMap<String, String>,
    pub details: Option<Value>,
    pub hidden: bool,
    /// Close the record immediately after creation.
    pub close: bool,
}

/// Handle to a record: a data object holding only metadata and details.
#[derive(Debug, Clone)]
pub struct Record {
    object: DataObject,
}

impl Record {
    /// Wraps an existing record id, scoped to `project` or the workspace.
    pub fn open(
        calls: Arc<dyn RemoteCall>,
        workspace: &Workspace,
        object_id: ObjectId,
        project: Option<ProjectId>,
    ) -> Self {
        let project = project.unwrap_or_else(|| workspace.project().clone());
        Self {
            object: DataObject::with_project(calls, workspace, object_id, project),
        }
    }

    /// Creates a record and returns a handle scoped to the project it was created in.
    pub fn create(
        calls: Arc<dyn RemoteCall>,
        workspace: &Workspace,
        spec: NewRecord,
    ) -> Result<Self, HandleError> {
        if let Some(details) = &spec.details
            && !(details.is_object() || details.is_array())
        {
            return Err(HandleError::InvalidPayload(
                "details must be a JSON object or array".to_string(),
            ));
        }

        let project = spec
            .project
            .unwrap_or_else(|| workspace.project().clone());
        project.validate()?;
        let params = encode(
            Operation::New,
            &NewObjectParams {
                project: Some(project.clone()),
                name: spec.name,
                folder: spec.folder,
                types: spec.types,
                tags: spec.tags,
                properties: spec.properties,
                details: spec.details,
                hidden: spec.hidden,
                close: spec.close,
            },
        )?;

        let response = calls.create(ObjectKind::Record.class_name(), params)?;
        let created: CreatedResponse = decode(Operation::New, response)?;
        tracing::debug!(object_id = %created.id, project = %project, "created record");

        Ok(Self::open(calls, workspace, created.id, Some(project)))
    }

    /// Clones the record into another project and returns the destination handle.
    pub fn clone_to(
        &self,
        destination_project: &ProjectId,
        destination_folder: &str,
    ) -> Result<Record, HandleError> {
        let object = self
            .object
            .clone_to(destination_project, destination_folder)?;
        Ok(Record { object })
    }
}

impl Deref for Record {
    type Target = DataObject;

    fn deref(&self) -> &DataObject {
        &self.object
    }
}
