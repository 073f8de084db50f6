use std::{fmt, sync::Arc, time::Duration};

use dxobj_core::{
    IdError, JobDescription, JobState, ObjectId, ObjectKind, Operation,
    protocol::{CreatedResponse, NewJobParams},
};
use dxobj_remote::{
    RemoteCall,
    codec::{decode, encode},
};
use serde_json::{Value, json};

use crate::{HandleError, StateProbe, StateWaiter};

/// Launch request for a job running another entry point of the current executable.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    /// Freeform input hash passed verbatim to the job.
    pub input: Value,
    /// Entry point to run.
    pub function: String,
    /// Defaults to the parent job's name plus the entry point.
    pub name: Option<String>,
    /// Minimum resources to allocate.
    pub resources: Option<Value>,
}

/// Handle to a job. Jobs have no project-scoped copies.
#[derive(Clone)]
pub struct Job {
    job_id: ObjectId,
    calls: Arc<dyn RemoteCall>,
    waiter: StateWaiter,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}

impl Job {
    /// Handle to an existing job. No remote call is made.
    pub fn new(calls: Arc<dyn RemoteCall>, job_id: ObjectId) -> Self {
        Self {
            job_id,
            calls,
            waiter: StateWaiter::default(),
        }
    }

    pub fn with_waiter(mut self, waiter: StateWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Launches a new job and returns a handle to it.
    pub fn create(calls: Arc<dyn RemoteCall>, spec: NewJob) -> Result<Self, HandleError> {
        if !spec.input.is_object() {
            return Err(HandleError::InvalidPayload(
                "job input must be a JSON object".to_string(),
            ));
        }

        let params = encode(
            Operation::New,
            &NewJobParams {
                input: spec.input,
                function: spec.function,
                name: spec.name,
                resources: spec.resources,
            },
        )?;
        let response = calls.create(ObjectKind::Job.class_name(), params)?;
        let created: CreatedResponse = decode(Operation::New, response)?;
        tracing::debug!(job_id = %created.id, "launched job");

        Ok(Self::new(calls, created.id))
    }

    /// Job id.
    pub fn id(&self) -> &ObjectId {
        &self.job_id
    }

    pub fn set_id(&mut self, job_id: ObjectId) {
        self.job_id = job_id;
    }

    /// Fetches the job's description, including its current state.
    pub fn describe(&self) -> Result<JobDescription, HandleError> {
        self.ensure_valid()?;
        let response = self.calls.describe(&self.job_id, json!({}))?;
        Ok(decode(Operation::Describe, response)?)
    }

    /// Current lifecycle state, read through [`Job::describe`].
    pub fn state(&self) -> Result<JobState, HandleError> {
        Ok(self.describe()?.state)
    }

    /// Terminates the job and its descendants. Only valid for a job without a parent.
    pub fn terminate(&self) -> Result<(), HandleError> {
        self.ensure_valid()?;
        tracing::debug!(job_id = %self.job_id, "terminating job");
        self.calls.terminate(&self.job_id, json!({}))?;
        Ok(())
    }

    /// Blocks until the job is done; `failed` or `terminated` end the wait with an error.
    pub fn wait_on_done(&self, timeout: Duration) -> Result<(), HandleError> {
        self.ensure_valid()?;
        self.waiter.wait(self, JobState::Done.as_str(), timeout)
    }

    fn ensure_valid(&self) -> Result<(), HandleError> {
        self.job_id.validate()?;
        let is_job = ObjectKind::from_id(&self.job_id) == Some(ObjectKind::Job);
        if !is_job || !self.calls.accepts(&self.job_id) {
            return Err(IdError::WrongClass(self.job_id.0.clone()).into());
        }
        Ok(())
    }
}

impl StateProbe for Job {
    fn subject(&self) -> String {
        self.job_id.0.clone()
    }

    fn observe_state(&self) -> Result<String, HandleError> {
        Ok(self.state()?.as_str().to_string())
    }

    fn is_terminal(&self, state: &str) -> bool {
        JobState::parse(state).is_some_and(JobState::is_terminal)
    }
}
