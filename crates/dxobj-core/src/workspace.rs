use std::env;

use crate::ProjectId;

/// Primary variable naming the current workspace.
pub const WORKSPACE_ENV: &str = "DX_WORKSPACE_ID";
/// Fallback variable naming the project context of the session.
pub const PROJECT_CONTEXT_ENV: &str = "DX_PROJECT_CONTEXT_ID";

/// Default project scope for handles constructed without an explicit project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    project: ProjectId,
}

impl Workspace {
    /// Workspace scoped to an explicit project.
    pub fn new(project: ProjectId) -> Self {
        Self { project }
    }

    /// Resolves the workspace from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves the workspace from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        [WORKSPACE_ENV, PROJECT_CONTEXT_ENV]
            .into_iter()
            .filter_map(|key| lookup(key))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .map(|value| Self::new(ProjectId(value)))
    }

    /// Project that unscoped handles bind to.
    pub fn project(&self) -> &ProjectId {
        &self.project
    }
}
