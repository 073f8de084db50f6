use std::collections::BTreeMap;

use dxobj_core::{
    Description, ErrorCode, LINK_KEY, ObjectId, ObjectLink, ObjectState, Operation, ProjectId,
    RemoteError, make_link,
    protocol::{NewObjectParams, PropertiesParams},
};
use serde_json::json;

#[test]
fn link_without_project_encodes_bare_id() {
    let link = make_link("record-0001", "");
    assert_eq!(link.project, None);

    let encoded = serde_json::to_value(&link).expect("link encode should succeed");
    assert_eq!(encoded, json!({ "$dnanexus_link": "record-0001" }));
}

#[test]
fn link_with_project_encodes_scoped_reference() {
    let link = make_link("file-0002", "project-0003");

    let encoded = serde_json::to_value(&link).expect("link encode should succeed");
    assert_eq!(
        encoded,
        json!({ "$dnanexus_link": { "project": "project-0003", "id": "file-0002" } })
    );

    let decoded: ObjectLink = serde_json::from_value(encoded).expect("link decode should succeed");
    assert_eq!(decoded, link);
}

#[test]
fn embedded_links_are_recognised_inside_details() {
    let details = json!({
        "reads": make_link("file-0002", "project-0003"),
        "label": "not a link",
        "wrapped": { LINK_KEY: "record-0001", "extra": true },
    });

    let reads = ObjectLink::from_value(&details["reads"]).expect("reads should be a link");
    assert_eq!(reads.object_id, ObjectId::new("file-0002"));
    assert_eq!(reads.project, Some(ProjectId::new("project-0003")));
    assert!(ObjectLink::from_value(&details["label"]).is_none());
    assert!(ObjectLink::from_value(&details["wrapped"]).is_none());
}

#[test]
fn description_decodes_minimum_contract_and_keeps_extra_fields() {
    let raw = json!({
        "id": "record-0001",
        "class": "record",
        "types": ["Report", "Csv"],
        "created": 1_700_000_000_000_u64,
        "state": "closing",
        "size": 42,
    });

    let desc: Description = serde_json::from_value(raw).expect("describe decode should succeed");
    assert_eq!(desc.id.as_str(), "record-0001");
    assert_eq!(desc.class, "record");
    assert!(desc.types.contains("Report"));
    assert_eq!(desc.created_at, 1_700_000_000_000);
    assert_eq!(desc.state, Some(ObjectState::Closing));
    assert_eq!(desc.properties, None);
    assert_eq!(desc.extra.get("size"), Some(&json!(42)));
}

#[test]
fn property_deletion_serialises_as_null() {
    let params = PropertiesParams {
        project: ProjectId::new("project-0001"),
        properties: BTreeMap::from([
            ("keep".to_string(), Some("yes".to_string())),
            ("drop".to_string(), None),
        ]),
    };

    let encoded = serde_json::to_value(&params).expect("params encode should succeed");
    assert_eq!(
        encoded,
        json!({ "project": "project-0001", "properties": { "drop": null, "keep": "yes" } })
    );
}

#[test]
fn new_object_params_omit_unset_fields() {
    let params = NewObjectParams {
        project: Some(ProjectId::new("project-0001")),
        name: Some("report.csv".to_string()),
        ..Default::default()
    };

    let encoded = serde_json::to_value(&params).expect("params encode should succeed");
    assert_eq!(
        encoded,
        json!({
            "project": "project-0001",
            "name": "report.csv",
            "hidden": false,
            "close": false,
        })
    );
}

#[test]
fn remote_error_codes_decode_and_unknown_codes_survive() {
    let err: RemoteError = serde_json::from_value(json!({
        "code": "PermissionDenied",
        "message": "no access",
        "detail": null,
    }))
    .expect("error decode should succeed");
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert_eq!(err.to_string(), "PermissionDenied: no access");

    let err: RemoteError = serde_json::from_value(json!({
        "code": "SpendingLimitExceeded",
        "message": "over budget",
        "detail": null,
    }))
    .expect("error decode should succeed");
    assert_eq!(err.code, ErrorCode::Unknown);
}

#[test]
fn operation_methods_resolve_both_ways() {
    for op in [
        Operation::Describe,
        Operation::SetVisibility,
        Operation::ListProjects,
        Operation::RemoveObjects,
    ] {
        assert_eq!(Operation::from_method(op.method()), Some(op));
    }
    assert_eq!(Operation::from_method("explode"), None);
    assert!(Operation::Move.targets_project());
    assert!(!Operation::Rename.targets_project());
}
