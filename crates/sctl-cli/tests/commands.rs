//! Subcommand handlers run against content trees in a temp directory.

use std::fs;
use std::path::Path;

use serde_json::json;

use sctl_cli::build::{build, run_build, BuildArgs};
use sctl_cli::config::BuildConfig;
use sctl_cli::validate::{run_validate, validate_tree, write_reports, ValidateArgs};
use sctl_cli::{EXIT_ERRORS, EXIT_OK};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn write_schemas(root: &Path) {
    let detection = json!({"type": "object", "required": ["spec_version"]});
    let story = json!({"type": "object", "required": ["id", "name"]});
    for (rel, schema) in [
        ("spec/v1/detection_search.json.spec", &detection),
        ("spec/v2/detections.spec.json", &detection),
        ("spec/v1/analytic_story.json.spec", &story),
        ("spec/v2/story.spec.json", &story),
    ] {
        write(root, rel, &schema.to_string());
    }
}

fn story(id: &str) -> String {
    json!({
        "spec_version": 2,
        "id": id,
        "name": "Account Takeover",
        "description": "Credential abuse.",
        "narrative": "Attackers reuse stolen credentials."
    })
    .to_string()
}

#[test]
fn validate_clean_tree_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_schemas(dir.path());
    write(dir.path(), "stories/a.json", &story("7b3e0d4c-3a9a-4d0e-8f1e-2c2a1f0b9e21"));

    let args = ValidateArgs {
        path: dir.path().to_path_buf(),
    };
    assert_eq!(run_validate(&args).unwrap(), EXIT_OK);
}

#[test]
fn validate_duplicate_story_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    write_schemas(dir.path());
    let id = "7b3e0d4c-3a9a-4d0e-8f1e-2c2a1f0b9e21";
    write(dir.path(), "stories/a.json", &story(id));
    write(dir.path(), "stories/b.json", &story(id));

    let args = ValidateArgs {
        path: dir.path().to_path_buf(),
    };
    assert_eq!(run_validate(&args).unwrap(), EXIT_ERRORS);
}

#[test]
fn validate_report_lists_findings_then_verdict() {
    let dir = tempfile::tempdir().unwrap();
    write_schemas(dir.path());
    let id = "7b3e0d4c-3a9a-4d0e-8f1e-2c2a1f0b9e21";
    write(dir.path(), "stories/a.json", &story(id));
    write(dir.path(), "stories/b.json", &story(id));

    let reports = validate_tree(dir.path()).unwrap();
    let mut err = Vec::new();
    let code = write_reports(&reports, &mut err).unwrap();
    let err = String::from_utf8(err).unwrap();

    assert_eq!(code, EXIT_ERRORS);
    assert!(err.starts_with("ERROR: Duplicate UUID found"), "{err}");
    assert!(err.contains("stories/b.json"), "{err}");
    assert!(err.ends_with("Errors found\n"), "{err}");
}

#[test]
fn clean_report_verdict() {
    let dir = tempfile::tempdir().unwrap();
    write_schemas(dir.path());
    write(dir.path(), "stories/a.json", &story("7b3e0d4c-3a9a-4d0e-8f1e-2c2a1f0b9e21"));

    let reports = validate_tree(dir.path()).unwrap();
    let mut err = Vec::new();
    assert_eq!(write_reports(&reports, &mut err).unwrap(), EXIT_OK);
    assert_eq!(String::from_utf8(err).unwrap(), "No Errors found\n");
}

#[test]
fn validate_without_schemas_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let args = ValidateArgs {
        path: dir.path().to_path_buf(),
    };
    assert!(run_validate(&args).is_err());
}

fn macro_tree(root: &Path) {
    write(
        root,
        "macros/security_content_ctime.yml",
        "name: security_content_ctime\ndefinition: convert timeformat=\"%Y\" ctime($field$)\narguments: [field]\n",
    );
    write(
        root,
        "lookups/risky_users.yml",
        "name: risky_users\ndescription: Users under watch.\nfilename: risky_users.csv\n",
    );
}

#[test]
fn clean_build_emits_output() {
    let dir = tempfile::tempdir().unwrap();
    macro_tree(dir.path());
    let out = dir.path().join("out/build.json");
    fs::create_dir_all(out.parent().unwrap()).unwrap();

    let config = BuildConfig {
        content_root: dir.path().to_path_buf(),
        emit: Some(out.clone()),
        ..BuildConfig::default()
    };
    assert_eq!(build(&config).unwrap(), EXIT_OK);

    let emitted: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(emitted["macros"][0]["name"], "security_content_ctime");
    assert_eq!(emitted["lookups"][0]["name"], "risky_users");
    assert_eq!(emitted["detections"], json!([]));
}

#[test]
fn failed_build_exits_one_and_skips_emit() {
    let dir = tempfile::tempdir().unwrap();
    macro_tree(dir.path());
    write(dir.path(), "macros/broken.yml", "name: [unclosed\n");
    let out = dir.path().join("build.json");

    let config = BuildConfig {
        content_root: dir.path().to_path_buf(),
        emit: Some(out.clone()),
        ..BuildConfig::default()
    };
    assert_eq!(build(&config).unwrap(), EXIT_ERRORS);
    assert!(!out.exists());
}

#[test]
fn missing_enrichment_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    macro_tree(dir.path());
    let config = BuildConfig {
        content_root: dir.path().to_path_buf(),
        enrichment: Some(dir.path().join("attack.yml")),
        ..BuildConfig::default()
    };
    let err = build(&config).unwrap_err();
    assert!(format!("{err:#}").contains("ATT&CK enrichment"), "{err:#}");
}

#[test]
fn config_file_supplies_content_root() {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("content");
    macro_tree(&content);
    let config_path = dir.path().join("sctl.yml");
    fs::write(
        &config_path,
        format!("content_root: {}\nworkers: 2\n", content.display()),
    )
    .unwrap();

    assert_eq!(run_build(&BuildArgs::default(), Some(&config_path)).unwrap(), EXIT_OK);
}

#[test]
fn unreadable_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yml");
    assert!(run_build(&BuildArgs::default(), Some(&missing)).is_err());
}
