//! End-to-end validation of a content tree on disk.

use std::fs;
use std::path::Path;

use serde_json::json;

use sctl_schema::{validate_family, ContentFamily, FindingKind, SchemaValidationError};

const DETECTION_ID: &str = "3f1a2b4c-0d9e-4f6a-8b7c-1d2e3f4a5b6c";

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn write_schemas(root: &Path) {
    write_json(
        &root.join("spec/v1/detection_search.json.spec"),
        &json!({
            "type": "object",
            "required": ["search_id", "search_name", "search", "spec_version"],
            "properties": {
                "search_id": {"type": "string"},
                "search_name": {"type": "string"},
                "search": {"type": "string"}
            }
        }),
    );
    write_json(
        &root.join("spec/v2/detections.spec.json"),
        &json!({
            "type": "object",
            "required": ["id", "name", "detect", "spec_version"],
            "properties": {
                "id": {"type": "string"},
                "name": {"type": "string"}
            }
        }),
    );
    write_json(
        &root.join("spec/v1/analytic_story.json.spec"),
        &json!({"type": "object", "required": ["id", "name"]}),
    );
    write_json(
        &root.join("spec/v2/story.spec.json"),
        &json!({"type": "object", "required": ["id", "name", "narrative"]}),
    );
}

fn v2_detection(id: &str, name: &str) -> serde_json::Value {
    json!({
        "spec_version": 2,
        "id": id,
        "name": name,
        "description": "Finds unusual logins.",
        "detect": {"splunk": {"correlation_rule": {
            "search": "| tstats count from datamodel=Authentication by user"
        }}},
        "data_metadata": {"data_models": ["Authentication"]}
    })
}

#[test]
fn clean_tree_has_no_findings() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_schemas(root);
    write_json(
        &root.join("detections/a.json"),
        &v2_detection(DETECTION_ID, "Suspicious Login"),
    );
    write_json(
        &root.join("detections/b.json"),
        &json!({
            "spec_version": 1,
            "search_id": "9e8d7c6b-5a4f-4e3d-8c2b-1a0f9e8d7c6b",
            "search_name": "Brute Force",
            "search": "| tstats count from datamodel=Authentication",
            "search_description": "Many failures.",
            "data_metadata": {"data_models": ["Authentication"]}
        }),
    );

    let report = validate_family(root, ContentFamily::Detection).unwrap();
    assert_eq!(report.files_checked, 2);
    assert!(!report.has_errors(), "{:?}", report.findings);
}

#[test]
fn duplicate_id_flagged_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_schemas(root);
    write_json(&root.join("detections/a.json"), &v2_detection(DETECTION_ID, "First"));
    write_json(&root.join("detections/b.json"), &v2_detection(DETECTION_ID, "Second"));

    let report = validate_family(root, ContentFamily::Detection).unwrap();
    let dups: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.message.starts_with("Duplicate UUID found"))
        .collect();
    assert_eq!(dups.len(), 1);
    assert!(dups[0].path.ends_with("detections/b.json"));
}

#[test]
fn unparsable_file_is_reported_and_others_still_checked() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_schemas(root);
    fs::create_dir_all(root.join("detections")).unwrap();
    fs::write(root.join("detections/broken.json"), "{not json").unwrap();
    let mut bad = v2_detection(DETECTION_ID, "Trailing ");
    bad["data_metadata"] = json!({"data_models": []});
    write_json(&root.join("detections/c.json"), &bad);

    let report = validate_family(root, ContentFamily::Detection).unwrap();
    assert_eq!(report.of_kind(FindingKind::Unreadable).count(), 1);
    let messages: Vec<_> = report
        .of_kind(FindingKind::Semantic)
        .map(|f| f.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "name has trailing spaces: 'Trailing '",
            "The search uses a data model but 'data_models' is empty",
        ]
    );
}

#[test]
fn yaml_stories_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_schemas(root);
    fs::create_dir_all(root.join("stories")).unwrap();
    fs::write(
        root.join("stories/takeover.yml"),
        "spec_version: 2\nid: ''\nname: Account Takeover\ndescription: Credential abuse.\n",
    )
    .unwrap();

    let report = validate_family(root, ContentFamily::Story).unwrap();
    let rendered: Vec<_> = report.findings.iter().map(ToString::to_string).collect();
    // v2 requires a narrative; the blank id is a semantic finding.
    assert_eq!(report.findings.len(), 2);
    assert!(rendered.iter().any(|r| r.starts_with("ERROR: Blank ID at:\n\t")));
}

#[test]
fn missing_schema_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = validate_family(dir.path(), ContentFamily::Detection).unwrap_err();
    assert!(matches!(err, SchemaValidationError::SchemaLoadError { .. }));
}
