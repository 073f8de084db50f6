use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use dxobj_core::{
    ErrorCode, ObjectId, ObjectKind, Operation, ProjectId, RemoteError,
};
use dxobj_remote::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::state::{SimConfig, SimState};

/// In-memory stand-in for the platform API, reachable through [`Transport`].
pub struct SimPlatform {
    state: Mutex<SimState>,
    injected: Mutex<VecDeque<RemoteError>>,
    requests: Mutex<Vec<String>>,
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimPlatform {
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: Mutex::new(SimState::new(config)),
            injected: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Platform pre-populated with the given projects.
    pub fn with_projects<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let platform = Self::default();
        for project in projects {
            platform.add_project(ProjectId(project.into()));
        }
        platform
    }

    pub fn add_project(&self, project: ProjectId) {
        self.state().add_project(project);
    }

    /// Registers an open object with a copy in `project` without issuing a request.
    pub fn seed_object(&self, object_id: ObjectId, project: &ProjectId) -> Result<(), RemoteError> {
        self.state().seed_object(object_id, project)
    }

    /// Forces an object into the `failed` state.
    pub fn fail_object(&self, object_id: &ObjectId) -> Result<(), RemoteError> {
        self.state().fail_object(object_id)
    }

    /// Forces a job into the `failed` state.
    pub fn fail_job(&self, job_id: &ObjectId) -> Result<(), RemoteError> {
        self.state().fail_job(job_id)
    }

    /// Makes the next request fail with `err`.
    pub fn inject_failure(&self, err: RemoteError) {
        lock(&self.injected).push_back(err);
    }

    /// Routes received so far, in order.
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        lock(&self.state)
    }

    fn dispatch(&self, route: &str, input: Value) -> Result<Value, RemoteError> {
        let (target, method) = parse_route(route)?;
        let op = Operation::from_method(method)
            .ok_or_else(|| invalid_route(route, "unknown method"))?;

        let mut state = self.state();
        if op == Operation::New {
            return match ObjectKind::from_class(target) {
                Some(ObjectKind::Job) => state.create_job(params(input)?),
                Some(kind) => state.create_object(kind.class_name(), params(input)?),
                None => Err(invalid_route(route, "unknown class")),
            };
        }

        if op.targets_project() {
            let project = ProjectId(target.to_string());
            return match op {
                Operation::Clone => state.clone_objects(&project, params(input)?),
                Operation::Move => state.move_objects(&project, params(input)?),
                _ => state.remove_objects(&project, params(input)?),
            };
        }

        let object_id = ObjectId(target.to_string());
        if ObjectKind::from_id(&object_id) == Some(ObjectKind::Job) {
            return match op {
                Operation::Describe => state.describe_job(&object_id),
                Operation::Terminate => state.terminate_job(&object_id),
                _ => Err(invalid_route(route, "jobs do not support this method")),
            };
        }

        match op {
            Operation::Describe => state.describe(&object_id, params(input)?),
            Operation::AddTypes => state.add_types(&object_id, params(input)?),
            Operation::RemoveTypes => state.remove_types(&object_id, params(input)?),
            Operation::GetDetails => state.get_details(&object_id),
            Operation::SetDetails => state.set_details(&object_id, input),
            Operation::SetVisibility => state.set_visibility(&object_id, params(input)?),
            Operation::Rename => state.rename(&object_id, params(input)?),
            Operation::SetProperties => state.set_properties(&object_id, params(input)?),
            Operation::AddTags => state.add_tags(&object_id, params(input)?),
            Operation::RemoveTags => state.remove_tags(&object_id, params(input)?),
            Operation::Close => state.close(&object_id),
            Operation::ListProjects => state.list_projects(&object_id),
            _ => Err(invalid_route(route, "data objects do not support this method")),
        }
    }
}

impl Transport for SimPlatform {
    fn request(&self, route: &str, input: Value) -> Result<Value, RemoteError> {
        lock(&self.requests).push(route.to_string());
        tracing::trace!(route, input = %input, "sim request");

        if let Some(err) = lock(&self.injected).pop_front() {
            tracing::trace!(route, error = %err, "sim injected failure");
            return Err(err);
        }

        let result = self.dispatch(route, input);
        if let Err(err) = &result {
            tracing::trace!(route, error = %err, "sim request failed");
        }
        result
    }
}

fn parse_route(route: &str) -> Result<(&str, &str), RemoteError> {
    let trimmed = route
        .strip_prefix('/')
        .ok_or_else(|| invalid_route(route, "route must start with '/'"))?;
    match trimmed.split_once('/') {
        Some((target, method)) if !target.is_empty() && !method.contains('/') => {
            Ok((target, method))
        }
        _ => Err(invalid_route(route, "expected /<target>/<method>")),
    }
}

fn params<T: DeserializeOwned>(input: Value) -> Result<T, RemoteError> {
    serde_json::from_value(input).map_err(|err| {
        RemoteError::new(ErrorCode::InvalidInput, "malformed input").with_detail(err.to_string())
    })
}

fn invalid_route(route: &str, reason: &str) -> RemoteError {
    RemoteError::new(ErrorCode::InvalidInput, format!("{route}: {reason}"))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
