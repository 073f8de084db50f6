use std::collections::{BTreeMap, BTreeSet};

use dxobj_core::{
    ErrorCode, JobState, ObjectId, ObjectKind, ObjectState, ProjectId, RemoteError, now_ms,
    protocol::{
        CloneParams, DescribeParams, MoveParams, NewJobParams, NewObjectParams, PropertiesParams,
        RemoveObjectsParams, RenameParams, TagsParams, TypesParams, VisibilityParams,
    },
};
use serde_json::{Map, Value, json};

/// Tunables for simulated platform timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Describe probes an object reports `closing` before it becomes `closed`.
    pub close_after_probes: u32,
    /// Describe probes a job spends in each state before advancing.
    pub job_probes_per_state: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            close_after_probes: 2,
            job_probes_per_state: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct ProjectCopy {
    name: String,
    folder: String,
    tags: BTreeSet<String>,
    properties: BTreeMap<String, String>,
    hidden: bool,
}

#[derive(Debug, Clone)]
struct ObjectEntry {
    class: String,
    types: BTreeSet<String>,
    details: Value,
    state: ObjectState,
    created_ms: u64,
    close_probes_left: u32,
    copies: BTreeMap<ProjectId, ProjectCopy>,
}

#[derive(Debug, Clone)]
struct JobEntry {
    name: String,
    function: String,
    input: Value,
    state: JobState,
    created_ms: u64,
    probes_in_state: u32,
}

/// Platform-side bookkeeping: object content, per-project copies and jobs.
pub struct SimState {
    config: SimConfig,
    next_id: u64,
    projects: BTreeSet<ProjectId>,
    objects: BTreeMap<ObjectId, ObjectEntry>,
    jobs: BTreeMap<ObjectId, JobEntry>,
}

impl SimState {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            next_id: 1,
            projects: BTreeSet::new(),
            objects: BTreeMap::new(),
            jobs: BTreeMap::new(),
        }
    }

    pub fn add_project(&mut self, project: ProjectId) {
        self.projects.insert(project);
    }

    /// Registers an existing open object with a copy in `project`.
    pub fn seed_object(
        &mut self,
        object_id: ObjectId,
        project: &ProjectId,
    ) -> Result<(), RemoteError> {
        self.ensure_project(project)?;
        let class = object_id.class().unwrap_or("object").to_string();
        let entry = self
            .objects
            .entry(object_id.clone())
            .or_insert_with(|| ObjectEntry {
                class,
                types: BTreeSet::new(),
                details: json!({}),
                state: ObjectState::Open,
                created_ms: now_ms(),
                close_probes_left: 0,
                copies: BTreeMap::new(),
            });
        entry
            .copies
            .entry(project.clone())
            .or_insert_with(|| default_copy(&object_id));
        Ok(())
    }

    pub fn fail_object(&mut self, object_id: &ObjectId) -> Result<(), RemoteError> {
        self.object_mut(object_id)?.state = ObjectState::Failed;
        Ok(())
    }

    pub fn create_object(
        &mut self,
        class: &str,
        params: NewObjectParams,
    ) -> Result<Value, RemoteError> {
        let project = params
            .project
            .ok_or_else(|| invalid_input("project is required"))?;
        self.ensure_project(&project)?;
        let folder = params.folder.unwrap_or_else(|| "/".to_string());
        check_folder(&folder)?;
        if let Some(details) = &params.details {
            check_details(details)?;
        }

        let object_id = self.allocate_id(class);
        let copy = ProjectCopy {
            name: params.name.unwrap_or_else(|| object_id.0.clone()),
            folder,
            tags: params.tags.into_iter().collect(),
            properties: params.properties,
            hidden: params.hidden,
        };
        let entry = ObjectEntry {
            class: class.to_string(),
            types: params.types.into_iter().collect(),
            details: params.details.unwrap_or_else(|| json!({})),
            state: if params.close {
                ObjectState::Closed
            } else {
                ObjectState::Open
            },
            created_ms: now_ms(),
            close_probes_left: 0,
            copies: BTreeMap::from([(project, copy)]),
        };

        self.objects.insert(object_id.clone(), entry);
        Ok(json!({ "id": object_id }))
    }

    pub fn describe(
        &mut self,
        object_id: &ObjectId,
        params: DescribeParams,
    ) -> Result<Value, RemoteError> {
        let entry = self.object_mut(object_id)?;
        if entry.state == ObjectState::Closing {
            if entry.close_probes_left == 0 {
                entry.state = ObjectState::Closed;
            } else {
                entry.close_probes_left -= 1;
            }
        }

        let copy = copy_in(entry, object_id, &params.project)?;
        let mut desc = json!({
            "id": object_id,
            "class": entry.class,
            "types": entry.types,
            "created": entry.created_ms,
            "state": entry.state,
            "project": params.project,
            "folder": copy.folder,
            "name": copy.name,
            "hidden": copy.hidden,
            "tags": copy.tags,
        });
        if params.properties {
            desc["properties"] = json!(copy.properties);
        }
        if params.details {
            desc["details"] = entry.details.clone();
        }
        Ok(desc)
    }

    pub fn add_types(
        &mut self,
        object_id: &ObjectId,
        params: TypesParams,
    ) -> Result<Value, RemoteError> {
        self.object_mut(object_id)?.types.extend(params.types);
        Ok(json!({ "id": object_id }))
    }

    pub fn remove_types(
        &mut self,
        object_id: &ObjectId,
        params: TypesParams,
    ) -> Result<Value, RemoteError> {
        let entry = self.object_mut(object_id)?;
        for t in &params.types {
            entry.types.remove(t);
        }
        Ok(json!({ "id": object_id }))
    }

    pub fn get_details(&mut self, object_id: &ObjectId) -> Result<Value, RemoteError> {
        Ok(self.object_mut(object_id)?.details.clone())
    }

    pub fn set_details(
        &mut self,
        object_id: &ObjectId,
        details: Value,
    ) -> Result<Value, RemoteError> {
        check_details(&details)?;
        let entry = self.object_mut(object_id)?;
        if entry.state != ObjectState::Open {
            return Err(RemoteError::new(
                ErrorCode::InvalidState,
                format!("{object_id} is not open"),
            ));
        }
        entry.details = details;
        Ok(json!({ "id": object_id }))
    }

    pub fn set_visibility(
        &mut self,
        object_id: &ObjectId,
        params: VisibilityParams,
    ) -> Result<Value, RemoteError> {
        self.copy_mut(object_id, &params.project)?.hidden = params.hidden;
        Ok(json!({ "id": object_id }))
    }

    pub fn rename(
        &mut self,
        object_id: &ObjectId,
        params: RenameParams,
    ) -> Result<Value, RemoteError> {
        if params.name.is_empty() {
            return Err(invalid_input("name cannot be empty"));
        }
        self.copy_mut(object_id, &params.project)?.name = params.name;
        Ok(json!({ "id": object_id }))
    }

    pub fn set_properties(
        &mut self,
        object_id: &ObjectId,
        params: PropertiesParams,
    ) -> Result<Value, RemoteError> {
        let copy = self.copy_mut(object_id, &params.project)?;
        for (key, value) in params.properties {
            match value {
                Some(value) => {
                    copy.properties.insert(key, value);
                }
                None => {
                    copy.properties.remove(&key);
                }
            }
        }
        Ok(json!({ "id": object_id }))
    }

    pub fn add_tags(
        &mut self,
        object_id: &ObjectId,
        params: TagsParams,
    ) -> Result<Value, RemoteError> {
        self.copy_mut(object_id, &params.project)?.tags.extend(params.tags);
        Ok(json!({ "id": object_id }))
    }

    pub fn remove_tags(
        &mut self,
        object_id: &ObjectId,
        params: TagsParams,
    ) -> Result<Value, RemoteError> {
        let copy = self.copy_mut(object_id, &params.project)?;
        for tag in &params.tags {
            copy.tags.remove(tag);
        }
        Ok(json!({ "id": object_id }))
    }

    pub fn close(&mut self, object_id: &ObjectId) -> Result<Value, RemoteError> {
        let close_after = self.config.close_after_probes;
        let entry = self.object_mut(object_id)?;
        match entry.state {
            ObjectState::Open => {
                entry.state = ObjectState::Closing;
                entry.close_probes_left = close_after;
            }
            ObjectState::Closing | ObjectState::Closed => {}
            ObjectState::Failed => {
                return Err(RemoteError::new(
                    ErrorCode::InvalidState,
                    format!("{object_id} has failed and cannot be closed"),
                ));
            }
        }
        Ok(json!({ "id": object_id }))
    }

    pub fn list_projects(&mut self, object_id: &ObjectId) -> Result<Value, RemoteError> {
        let access: Map<String, Value> = self
            .object_mut(object_id)?
            .copies
            .keys()
            .map(|project| (project.0.clone(), json!("ADMINISTER")))
            .collect();
        Ok(Value::Object(access))
    }

    pub fn clone_objects(
        &mut self,
        source: &ProjectId,
        params: CloneParams,
    ) -> Result<Value, RemoteError> {
        self.ensure_project(source)?;
        self.ensure_project(&params.project)?;
        check_folder(&params.destination)?;

        let mut exists = Vec::new();
        for object_id in &params.objects {
            let entry = self.object_mut(object_id)?;
            let mut copy = copy_in(entry, object_id, source)?.clone();
            copy.folder = params.destination.clone();
            match entry.copies.get_mut(&params.project) {
                Some(existing) => {
                    existing.folder = params.destination.clone();
                    exists.push(object_id.clone());
                }
                None => {
                    entry.copies.insert(params.project.clone(), copy);
                }
            }
        }

        Ok(json!({ "id": source, "project": params.project, "exists": exists }))
    }

    pub fn move_objects(
        &mut self,
        project: &ProjectId,
        params: MoveParams,
    ) -> Result<Value, RemoteError> {
        self.ensure_project(project)?;
        check_folder(&params.destination)?;
        for object_id in &params.objects {
            self.copy_mut(object_id, project)?.folder = params.destination.clone();
        }
        Ok(json!({ "id": project }))
    }

    pub fn remove_objects(
        &mut self,
        project: &ProjectId,
        params: RemoveObjectsParams,
    ) -> Result<Value, RemoteError> {
        self.ensure_project(project)?;
        for object_id in &params.objects {
            let entry = self.object_mut(object_id)?;
            if entry.copies.remove(project).is_none() {
                return Err(not_found(format!("{object_id} is not in {project}")));
            }
            if entry.copies.is_empty() {
                self.objects.remove(object_id);
            }
        }
        Ok(json!({ "id": project }))
    }

    pub fn create_job(&mut self, params: NewJobParams) -> Result<Value, RemoteError> {
        if params.function.is_empty() {
            return Err(invalid_input("function cannot be empty"));
        }
        let job_id = self.allocate_id(ObjectKind::Job.class_name());
        let name = params
            .name
            .unwrap_or_else(|| format!("job:{}", params.function));
        self.jobs.insert(
            job_id.clone(),
            JobEntry {
                name,
                function: params.function,
                input: params.input,
                state: JobState::Idle,
                created_ms: now_ms(),
                probes_in_state: 0,
            },
        );
        Ok(json!({ "id": job_id }))
    }

    pub fn describe_job(&mut self, job_id: &ObjectId) -> Result<Value, RemoteError> {
        let per_state = self.config.job_probes_per_state;
        let job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| not_found(format!("{job_id} does not exist")))?;

        let desc = json!({
            "id": job_id,
            "state": job.state,
            "name": job.name,
            "function": job.function,
            "created": job.created_ms,
            "originalInput": job.input,
        });

        job.probes_in_state += 1;
        if job.probes_in_state >= per_state
            && let Some(next) = next_job_state(job.state)
        {
            job.state = next;
            job.probes_in_state = 0;
        }

        Ok(desc)
    }

    pub fn terminate_job(&mut self, job_id: &ObjectId) -> Result<Value, RemoteError> {
        let job = self
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| not_found(format!("{job_id} does not exist")))?;
        if job.state.is_terminal() {
            return Err(RemoteError::new(
                ErrorCode::InvalidState,
                format!("{job_id} already finished"),
            ));
        }
        job.state = JobState::Terminated;
        Ok(json!({ "id": job_id }))
    }

    pub fn fail_job(&mut self, job_id: &ObjectId) -> Result<(), RemoteError> {
        self.jobs
            .get_mut(job_id)
            .ok_or_else(|| not_found(format!("{job_id} does not exist")))?
            .state = JobState::Failed;
        Ok(())
    }

    fn allocate_id(&mut self, class: &str) -> ObjectId {
        let id = ObjectId(format!("{class}-{:024}", self.next_id));
        self.next_id += 1;
        id
    }

    fn ensure_project(&self, project: &ProjectId) -> Result<(), RemoteError> {
        if self.projects.contains(project) {
            Ok(())
        } else {
            Err(not_found(format!("project {project} does not exist")))
        }
    }

    fn object_mut(&mut self, object_id: &ObjectId) -> Result<&mut ObjectEntry, RemoteError> {
        self.objects
            .get_mut(object_id)
            .ok_or_else(|| not_found(format!("{object_id} does not exist")))
    }

    fn copy_mut(
        &mut self,
        object_id: &ObjectId,
        project: &ProjectId,
    ) -> Result<&mut ProjectCopy, RemoteError> {
        self.object_mut(object_id)?
            .copies
            .get_mut(project)
            .ok_or_else(|| not_found(format!("{object_id} is not in {project}")))
    }
}

fn copy_in<'a>(
    entry: &'a ObjectEntry,
    object_id: &ObjectId,
    project: &ProjectId,
) -> Result<&'a ProjectCopy, RemoteError> {
    entry
        .copies
        .get(project)
        .ok_or_else(|| not_found(format!("{object_id} is not in {project}")))
}

fn default_copy(object_id: &ObjectId) -> ProjectCopy {
    ProjectCopy {
        name: object_id.0.clone(),
        folder: "/".to_string(),
        tags: BTreeSet::new(),
        properties: BTreeMap::new(),
        hidden: false,
    }
}

fn next_job_state(state: JobState) -> Option<JobState> {
    match state {
        JobState::Idle => Some(JobState::Runnable),
        JobState::Runnable => Some(JobState::Running),
        JobState::Running => Some(JobState::Done),
        _ => None,
    }
}

fn check_folder(folder: &str) -> Result<(), RemoteError> {
    if folder.starts_with('/') {
        Ok(())
    } else {
        Err(invalid_input(format!("folder '{folder}' must be absolute")))
    }
}

fn check_details(details: &Value) -> Result<(), RemoteError> {
    if details.is_object() || details.is_array() {
        Ok(())
    } else {
        Err(invalid_input("details must be a JSON object or array"))
    }
}

fn not_found(message: String) -> RemoteError {
    RemoteError::new(ErrorCode::ResourceNotFound, message)
}

fn invalid_input(message: impl Into<String>) -> RemoteError {
    RemoteError::new(ErrorCode::InvalidInput, message)
}
