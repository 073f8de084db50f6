use std::fmt;

use serde::{Deserialize, Serialize};

use crate::IdError;

/// Identifies a data object's content on the platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(
    /// Platform-assigned identifier string.
    pub String,
);

/// Identifies a project (or container) holding copies of objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(
    /// Platform-assigned identifier string.
    pub String,
);

impl ObjectId {
    /// Wraps an id string; call [`ObjectId::validate`] before sending it anywhere.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Class prefix of the id, e.g. `record` for `record-B4jq...`.
    pub fn class(&self) -> Option<&str> {
        self.0.split_once('-').map(|(class, _)| class)
    }

    /// Checks the `<class>-<suffix>` shape without contacting the platform.
    pub fn validate(&self) -> Result<(), IdError> {
        if self.0.is_empty() {
            return Err(IdError::Empty);
        }

        let Some((class, suffix)) = self.0.split_once('-') else {
            return Err(IdError::Malformed(self.0.clone()));
        };

        let class_ok = !class.is_empty() && class.bytes().all(|b| b.is_ascii_lowercase());
        let suffix_ok = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_alphanumeric());
        if class_ok && suffix_ok {
            Ok(())
        } else {
            Err(IdError::Malformed(self.0.clone()))
        }
    }
}

impl ProjectId {
    /// Wraps a project id without validating it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Rejects an empty or blank scope.
    pub fn validate(&self) -> Result<(), IdError> {
        if self.0.trim().is_empty() {
            return Err(IdError::EmptyProject);
        }
        Ok(())
    }

    /// Borrow the raw project id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object kinds the platform hosts, keyed by id class prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Record,
    File,
    GTable,
    Applet,
    Workflow,
    Job,
}

impl ObjectKind {
    /// Id prefix and route target used when creating objects of this kind.
    pub fn class_name(self) -> &'static str {
        match self {
            ObjectKind::Record => "record",
            ObjectKind::File => "file",
            ObjectKind::GTable => "gtable",
            ObjectKind::Applet => "applet",
            ObjectKind::Workflow => "workflow",
            ObjectKind::Job => "job",
        }
    }

    /// Inverse of [`ObjectKind::class_name`].
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "record" => Some(ObjectKind::Record),
            "file" => Some(ObjectKind::File),
            "gtable" => Some(ObjectKind::GTable),
            "applet" => Some(ObjectKind::Applet),
            "workflow" => Some(ObjectKind::Workflow),
            "job" => Some(ObjectKind::Job),
            _ => None,
        }
    }

    /// Kind named by an id's class prefix, if it is a known one.
    pub fn from_id(id: &ObjectId) -> Option<Self> {
        id.class().and_then(Self::from_class)
    }

    /// Jobs have no project-scoped copies.
    pub fn is_data_object(self) -> bool {
        !matches!(self, ObjectKind::Job)
    }
}
