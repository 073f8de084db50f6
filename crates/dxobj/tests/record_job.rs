mod common;

use std::{collections::BTreeMap, time::Duration};

use common::{Fixture, HOME, OTHER, manual_waiter};
use dxobj::{HandleError, Job, NewJob, NewRecord, ObjectId, ObjectState, ProjectId, Record};
use dxobj_core::{ErrorCode, JobState, ObjectKind};
use serde_json::json;

#[test]
fn record_create_applies_initial_metadata() {
    let fixture = Fixture::new();
    let record = Record::create(
        fixture.calls(ObjectKind::Record),
        &fixture.workspace,
        NewRecord {
            name: Some("sample".to_string()),
            folder: Some("/inputs".to_string()),
            types: vec!["Sample".to_string()],
            tags: vec!["qc".to_string()],
            properties: BTreeMap::from([("lane".to_string(), "3".to_string())]),
            details: Some(json!({ "reads": dxobj::make_link("file-0001", "") })),
            ..Default::default()
        },
    )
    .expect("record create should succeed");

    assert_eq!(record.project_id().as_str(), HOME);
    assert_eq!(ObjectKind::from_id(record.id()), Some(ObjectKind::Record));

    let desc = record
        .describe_with(dxobj::DescribeOptions {
            properties: true,
            details: true,
        })
        .expect("describe should succeed");
    assert_eq!(desc.name.as_deref(), Some("sample"));
    assert_eq!(desc.folder.as_deref(), Some("/inputs"));
    assert!(desc.types.contains("Sample"));
    assert_eq!(desc.state, Some(ObjectState::Open));
    assert_eq!(
        desc.properties.and_then(|p| p.get("lane").cloned()).as_deref(),
        Some("3")
    );
    let details = desc.details.expect("details should be included");
    let link = dxobj::ObjectLink::from_value(&details["reads"]).expect("reads should be a link");
    assert_eq!(link.object_id, ObjectId::new("file-0001"));
}

#[test]
fn record_create_in_explicit_project_and_closed() {
    let fixture = Fixture::new();
    let record = Record::create(
        fixture.calls(ObjectKind::Record),
        &fixture.workspace,
        NewRecord {
            project: Some(ProjectId::new(OTHER)),
            close: true,
            ..Default::default()
        },
    )
    .expect("record create should succeed");

    assert_eq!(record.project_id().as_str(), OTHER);
    record
        .wait_on_state(ObjectState::Closed, Duration::ZERO)
        .expect("closed record should satisfy a zero timeout wait");

    let err = record
        .set_details(json!({}))
        .expect_err("closed record details are immutable");
    assert_eq!(err.remote_code(), Some(ErrorCode::InvalidState));
}

#[test]
fn record_open_uses_workspace_unless_project_given() {
    let fixture = Fixture::new();
    let calls = fixture.calls(ObjectKind::Record);

    let default_scoped = Record::open(
        calls.clone(),
        &fixture.workspace,
        ObjectId::new("record-0001"),
        None,
    );
    let explicit = Record::open(
        calls,
        &fixture.workspace,
        ObjectId::new("record-0001"),
        Some(ProjectId::new(OTHER)),
    );

    assert_eq!(default_scoped.project_id().as_str(), HOME);
    assert_eq!(explicit.project_id().as_str(), OTHER);
    assert_eq!(default_scoped.id(), explicit.id());
}

#[test]
fn job_runs_to_done() {
    let fixture = Fixture::new();
    let (clock, waiter) = manual_waiter();
    let job = Job::create(
        fixture.calls(ObjectKind::Job),
        NewJob {
            input: json!({ "n": 3 }),
            function: "process".to_string(),
            name: None,
            resources: None,
        },
    )
    .expect("job create should succeed")
    .with_waiter(waiter);

    let desc = job.describe().expect("describe should succeed");
    assert_eq!(desc.state, JobState::Idle);
    assert_eq!(desc.function.as_deref(), Some("process"));
    assert_eq!(desc.name.as_deref(), Some("job:process"));

    job.wait_on_done(Duration::from_secs(30))
        .expect("job should finish");
    assert_eq!(clock.sleeps().len(), 2);
    assert_eq!(job.state().expect("state should succeed"), JobState::Done);
}

#[test]
fn terminated_job_fails_the_wait() {
    let fixture = Fixture::new();
    let (_clock, waiter) = manual_waiter();
    let job = Job::create(
        fixture.calls(ObjectKind::Job),
        NewJob {
            input: json!({}),
            function: "main".to_string(),
            name: Some("long".to_string()),
            resources: Some(json!({ "main": { "instanceType": "small" } })),
        },
    )
    .expect("job create should succeed")
    .with_waiter(waiter);

    job.terminate().expect("terminate should succeed");
    let err = job
        .wait_on_done(Duration::from_secs(30))
        .expect_err("terminated job should not be done");
    assert!(matches!(
        err,
        HandleError::UnexpectedTerminalState { ref observed, .. } if observed == "terminated"
    ));

    let err = job.terminate().expect_err("second terminate should fail");
    assert_eq!(err.remote_code(), Some(ErrorCode::InvalidState));
}

#[test]
fn failed_job_and_bad_input_are_reported() {
    let fixture = Fixture::new();
    let calls = fixture.calls(ObjectKind::Job);

    let err = Job::create(
        calls.clone(),
        NewJob {
            input: json!([1, 2]),
            function: "main".to_string(),
            name: None,
            resources: None,
        },
    )
    .expect_err("array input should be rejected");
    assert!(matches!(err, HandleError::InvalidPayload(_)));

    let (_clock, waiter) = manual_waiter();
    let job = Job::create(
        calls,
        NewJob {
            input: json!({}),
            function: "main".to_string(),
            name: None,
            resources: None,
        },
    )
    .expect("job create should succeed")
    .with_waiter(waiter);
    fixture
        .platform
        .fail_job(job.id())
        .expect("fail should succeed");

    let err = job
        .wait_on_done(Duration::from_secs(30))
        .expect_err("failed job should not be done");
    assert!(matches!(err, HandleError::UnexpectedTerminalState { .. }));
}

#[test]
fn job_handle_rejects_non_job_ids() {
    let fixture = Fixture::new();
    let mut job = Job::new(fixture.generic(), ObjectId::new("record-0001"));

    assert!(matches!(
        job.describe(),
        Err(HandleError::InvalidReference(_))
    ));

    job.set_id(ObjectId::new("job-0001"));
    let err = job.describe().expect_err("unknown job should fail");
    assert_eq!(err.remote_code(), Some(ErrorCode::ResourceNotFound));
}
