use dxobj_core::{ErrorCode, ObjectId, ProjectId, RemoteError};
use dxobj_remote::Transport;
use dxobj_sim::{SimConfig, SimPlatform};
use serde_json::{Value, json};

fn create_record(platform: &SimPlatform, project: &str) -> String {
    let created = platform
        .request("/record/new", json!({ "project": project, "name": "r" }))
        .expect("record create should succeed");
    created["id"]
        .as_str()
        .expect("created id should be a string")
        .to_string()
}

fn describe(platform: &SimPlatform, id: &str, project: &str) -> Value {
    platform
        .request(
            &format!("/{id}/describe"),
            json!({ "project": project, "properties": true, "details": true }),
        )
        .expect("describe should succeed")
}

#[test]
fn created_record_is_open_with_default_folder() {
    let platform = SimPlatform::with_projects(["project-a"]);
    let id = create_record(&platform, "project-a");
    assert!(id.starts_with("record-"));

    let desc = describe(&platform, &id, "project-a");
    assert_eq!(desc["state"], "open");
    assert_eq!(desc["folder"], "/");
    assert_eq!(desc["name"], "r");
    assert_eq!(desc["details"], json!({}));
}

#[test]
fn close_reports_closing_for_configured_probes() {
    let platform = SimPlatform::new(SimConfig {
        close_after_probes: 1,
        job_probes_per_state: 1,
    });
    platform.add_project(ProjectId::new("project-a"));
    let id = create_record(&platform, "project-a");

    platform
        .request(&format!("/{id}/close"), json!({}))
        .expect("close should succeed");

    assert_eq!(describe(&platform, &id, "project-a")["state"], "closing");
    assert_eq!(describe(&platform, &id, "project-a")["state"], "closed");
    assert_eq!(describe(&platform, &id, "project-a")["state"], "closed");
}

#[test]
fn copies_are_project_local_and_content_is_shared() {
    let platform = SimPlatform::with_projects(["project-a", "project-b"]);
    let id = create_record(&platform, "project-a");

    platform
        .request(
            "/project-a/clone",
            json!({ "objects": [id], "project": "project-b", "destination": "/in" }),
        )
        .expect("clone should succeed");
    platform
        .request(
            &format!("/{id}/rename"),
            json!({ "project": "project-b", "name": "renamed" }),
        )
        .expect("rename should succeed");
    platform
        .request(&format!("/{id}/addTypes"), json!({ "types": ["T"] }))
        .expect("addTypes should succeed");

    let a = describe(&platform, &id, "project-a");
    let b = describe(&platform, &id, "project-b");
    assert_eq!(a["name"], "r");
    assert_eq!(b["name"], "renamed");
    assert_eq!(b["folder"], "/in");
    assert_eq!(a["types"], json!(["T"]));
    assert_eq!(a["types"], b["types"]);

    let projects = platform
        .request(&format!("/{id}/listProjects"), json!({}))
        .expect("listProjects should succeed");
    assert_eq!(
        projects,
        json!({ "project-a": "ADMINISTER", "project-b": "ADMINISTER" })
    );
}

#[test]
fn removing_last_copy_deletes_the_object() {
    let platform = SimPlatform::with_projects(["project-a"]);
    let id = create_record(&platform, "project-a");

    platform
        .request("/project-a/removeObjects", json!({ "objects": [id] }))
        .expect("remove should succeed");

    let err = platform
        .request(&format!("/{id}/listProjects"), json!({}))
        .expect_err("object should be gone");
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[test]
fn relative_folders_and_scalar_details_are_rejected() {
    let platform = SimPlatform::with_projects(["project-a"]);
    let id = create_record(&platform, "project-a");

    let err = platform
        .request(
            "/project-a/move",
            json!({ "objects": [id], "destination": "relative" }),
        )
        .expect_err("relative folder should be rejected");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let err = platform
        .request(&format!("/{id}/setDetails"), json!(5))
        .expect_err("scalar details should be rejected");
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn injected_failure_applies_to_next_request_only() {
    let platform = SimPlatform::with_projects(["project-a"]);
    platform
        .seed_object(ObjectId::new("obj-123"), &ProjectId::new("project-a"))
        .expect("seed should succeed");
    platform.inject_failure(RemoteError::new(ErrorCode::PermissionDenied, "nope"));

    let err = platform
        .request("/obj-123/getDetails", json!({}))
        .expect_err("injected failure should surface");
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    platform
        .request("/obj-123/getDetails", json!({}))
        .expect("second request should succeed");
    assert_eq!(platform.requests().len(), 2);
}

#[test]
fn jobs_advance_one_state_per_probe() {
    let platform = SimPlatform::with_projects(["project-a"]);
    let created = platform
        .request("/job/new", json!({ "input": {}, "function": "main" }))
        .expect("job create should succeed");
    let route = format!("/{}/describe", created["id"].as_str().expect("job id"));

    let states: Vec<Value> = (0..5)
        .map(|_| {
            platform
                .request(&route, json!({}))
                .expect("job describe should succeed")["state"]
                .clone()
        })
        .collect();
    assert_eq!(
        states,
        vec![
            json!("idle"),
            json!("runnable"),
            json!("running"),
            json!("done"),
            json!("done"),
        ]
    );
}

#[test]
fn malformed_routes_are_invalid_input() {
    let platform = SimPlatform::default();
    for route in ["record/new", "/record", "/record-1/explode", "/widget/new"] {
        let err = platform
            .request(route, json!({}))
            .expect_err("malformed route should fail");
        assert_eq!(err.code, ErrorCode::InvalidInput, "{route}");
    }
}
