use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ObjectId, ProjectId};

/// Key under which the platform recognises an embedded object reference.
pub const LINK_KEY: &str = "$dnanexus_link";

/// Portable reference to a data object, embeddable in any payload.
///
/// Serializes to the platform's link shape; use `serde_json::to_value` to embed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LinkWire", into = "LinkWire")]
pub struct ObjectLink {
    /// Referenced object.
    pub object_id: ObjectId,
    /// Project to resolve the object through; the platform picks one when absent.
    pub project: Option<ProjectId>,
}

/// Builds a link to `object_id`. An empty `project` encodes the bare id.
pub fn make_link(object_id: impl Into<String>, project: impl Into<String>) -> ObjectLink {
    let project = project.into();
    ObjectLink {
        object_id: ObjectId(object_id.into()),
        project: (!project.is_empty()).then_some(ProjectId(project)),
    }
}

impl ObjectLink {
    /// Recognises a link embedded in an arbitrary payload value.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if map.len() != 1 || !map.contains_key(LINK_KEY) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

#[derive(Serialize, Deserialize)]
struct LinkWire {
    #[serde(rename = "$dnanexus_link")]
    target: LinkTarget,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LinkTarget {
    Bare(ObjectId),
    Scoped { project: ProjectId, id: ObjectId },
}

impl From<LinkWire> for ObjectLink {
    fn from(wire: LinkWire) -> Self {
        match wire.target {
            LinkTarget::Bare(object_id) => ObjectLink {
                object_id,
                project: None,
            },
            LinkTarget::Scoped { project, id } => ObjectLink {
                object_id: id,
                project: Some(project),
            },
        }
    }
}

impl From<ObjectLink> for LinkWire {
    fn from(link: ObjectLink) -> Self {
        let target = match link.project {
            None => LinkTarget::Bare(link.object_id),
            Some(project) => LinkTarget::Scoped {
                project,
                id: link.object_id,
            },
        };
        LinkWire { target }
    }
}
