use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ObjectId, ProjectId};

/// Remote methods reachable through the call interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Describe,
    AddTypes,
    RemoveTypes,
    GetDetails,
    SetDetails,
    SetVisibility,
    Rename,
    SetProperties,
    AddTags,
    RemoveTags,
    Close,
    ListProjects,
    /// Project container method; the target is the source project.
    Clone,
    /// Project container method; the target is the project being reorganised.
    Move,
    /// Project container method; the target is the project losing its copies.
    RemoveObjects,
    /// Class-level creation; the target is the class name.
    New,
    Terminate,
}

impl Operation {
    /// Method name as it appears in the route.
    pub fn method(self) -> &'static str {
        match self {
            Operation::Describe => "describe",
            Operation::AddTypes => "addTypes",
            Operation::RemoveTypes => "removeTypes",
            Operation::GetDetails => "getDetails",
            Operation::SetDetails => "setDetails",
            Operation::SetVisibility => "setVisibility",
            Operation::Rename => "rename",
            Operation::SetProperties => "setProperties",
            Operation::AddTags => "addTags",
            Operation::RemoveTags => "removeTags",
            Operation::Close => "close",
            Operation::ListProjects => "listProjects",
            Operation::Clone => "clone",
            Operation::Move => "move",
            Operation::RemoveObjects => "removeObjects",
            Operation::New => "new",
            Operation::Terminate => "terminate",
        }
    }

    pub fn from_method(method: &str) -> Option<Self> {
        const ALL: [Operation; 17] = [
            Operation::Describe,
            Operation::AddTypes,
            Operation::RemoveTypes,
            Operation::GetDetails,
            Operation::SetDetails,
            Operation::SetVisibility,
            Operation::Rename,
            Operation::SetProperties,
            Operation::AddTags,
            Operation::RemoveTags,
            Operation::Close,
            Operation::ListProjects,
            Operation::Clone,
            Operation::Move,
            Operation::RemoveObjects,
            Operation::New,
            Operation::Terminate,
        ];
        ALL.into_iter().find(|op| op.method() == method)
    }

    /// True when the route target is a project rather than the object itself.
    pub fn targets_project(self) -> bool {
        matches!(
            self,
            Operation::Clone | Operation::Move | Operation::RemoveObjects
        )
    }
}

/// Lifecycle state of a data object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectState {
    Open,
    Closing,
    Closed,
    Failed,
}

impl ObjectState {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectState::Open => "open",
            ObjectState::Closing => "closing",
            ObjectState::Closed => "closed",
            ObjectState::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            ObjectState::Open,
            ObjectState::Closing,
            ObjectState::Closed,
            ObjectState::Failed,
        ]
        .into_iter()
        .find(|state| state.as_str() == value)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ObjectState::Closed | ObjectState::Failed)
    }
}

/// Execution state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    WaitingOnInput,
    Runnable,
    Running,
    WaitingOnOutput,
    Done,
    Failed,
    Terminating,
    Terminated,
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::WaitingOnInput => "waiting_on_input",
            JobState::Runnable => "runnable",
            JobState::Running => "running",
            JobState::WaitingOnOutput => "waiting_on_output",
            JobState::Done => "done",
            JobState::Failed => "failed",
            JobState::Terminating => "terminating",
            JobState::Terminated => "terminated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        [
            JobState::Idle,
            JobState::WaitingOnInput,
            JobState::Runnable,
            JobState::Running,
            JobState::WaitingOnOutput,
            JobState::Done,
            JobState::Failed,
            JobState::Terminating,
            JobState::Terminated,
        ]
        .into_iter()
        .find(|state| state.as_str() == value)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Failed | JobState::Terminated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeParams {
    pub project: ProjectId,
    pub properties: bool,
    pub details: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypesParams {
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityParams {
    pub project: ProjectId,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameParams {
    pub project: ProjectId,
    pub name: String,
}

/// A `None` value deletes the property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertiesParams {
    pub project: ProjectId,
    pub properties: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsParams {
    pub project: ProjectId,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneParams {
    pub objects: Vec<ObjectId>,
    pub project: ProjectId,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveParams {
    pub objects: Vec<ObjectId>,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveObjectsParams {
    pub objects: Vec<ObjectId>,
}

/// Parameters for creating a data object of any class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewObjectParams {
    pub project: Option<ProjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub close: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobParams {
    pub input: Value,
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
}

/// Projects holding a copy, either as a project-to-access-level map or a plain id list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListProjectsResponse {
    Access(BTreeMap<ProjectId, String>),
    Ids(Vec<ProjectId>),
}

impl ListProjectsResponse {
    pub fn into_projects(self) -> BTreeSet<ProjectId> {
        match self {
            ListProjectsResponse::Access(map) => map.into_keys().collect(),
            ListProjectsResponse::Ids(ids) => ids.into_iter().collect(),
        }
    }
}

/// Response to any `new` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: ObjectId,
}

/// Metadata returned by `describe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    pub id: ObjectId,
    pub class: String,
    #[serde(default)]
    pub types: BTreeSet<String>,
    /// Creation time in UNIX milliseconds.
    #[serde(alias = "created")]
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ObjectState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Class-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub id: ObjectId,
    pub state: JobState,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default, alias = "created")]
    pub created_at: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
