//! # Semantic Manifest Validation
//!
//! Business rules the JSON schemas cannot express: unique identifiers
//! across a run, ASCII-only prose, names without trailing whitespace, and
//! data-model / sourcetype metadata that matches what the search uses.
//!
//! ## Design
//!
//! The two spec versions name the same concepts differently (`search_id`
//! vs `id`, `search` vs `detect.splunk.correlation_rule.search`). Rather
//! than branching inside every rule, each version is described by a table
//! of JSON Pointers ([`DetectionFields`], [`StoryFields`]) and one set of
//! rules runs over whichever table applies. Both versions therefore report
//! through the same [`ContentViolation`] vocabulary.
//!
//! Validation never fails: a field that is absent or of the wrong type is
//! skipped here because the structural check already reported it.

use serde_json::Value;

use sctl_core::{text, ContentViolation, SeenIds};

use crate::validate::SpecVersion;

/// Where each detection concept lives in a manifest of one spec version.
#[derive(Debug, Clone, Copy)]
pub struct DetectionFields {
    /// Identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Search text scanned for data-model and sourcetype usage.
    pub search: &'static str,
    /// Object holding `data_models` and `data_sourcetypes`.
    pub data_metadata: &'static str,
    /// Free-text fields that must be ASCII, as `(label, pointer)`.
    pub ascii: &'static [(&'static str, &'static str)],
}

const DETECTION_V1: DetectionFields = DetectionFields {
    id: "/search_id",
    name: "/search_name",
    search: "/search",
    data_metadata: "/data_metadata",
    ascii: &[
        ("search_description", "/search_description"),
        ("how_to_implement", "/how_to_implement"),
        ("eli5", "/eli5"),
        ("known_false_positives", "/known_false_positives"),
        ("rule_title", "/correlation_rule/notable/rule_title"),
        ("rule_description", "/correlation_rule/notable/rule_description"),
    ],
};

const DETECTION_V2: DetectionFields = DetectionFields {
    id: "/id",
    name: "/name",
    search: "/detect/splunk/correlation_rule/search",
    data_metadata: "/data_metadata",
    ascii: &[
        ("description", "/description"),
        ("how_to_implement", "/how_to_implement"),
        ("eli5", "/eli5"),
        ("known_false_positives", "/known_false_positives"),
    ],
};

impl DetectionFields {
    /// The table for `version`.
    pub fn for_version(version: SpecVersion) -> &'static DetectionFields {
        match version {
            SpecVersion::V1 => &DETECTION_V1,
            SpecVersion::V2 => &DETECTION_V2,
        }
    }
}

/// Where each story concept lives in a manifest of one spec version.
#[derive(Debug, Clone, Copy)]
pub struct StoryFields {
    /// Identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Free-text fields that must be ASCII, as `(label, pointer)`.
    pub ascii: &'static [(&'static str, &'static str)],
}

// Story manifests kept their field names across versions.
const STORY_V1: StoryFields = StoryFields {
    id: "/id",
    name: "/name",
    ascii: &[("description", "/description"), ("narrative", "/narrative")],
};

const STORY_V2: StoryFields = STORY_V1;

impl StoryFields {
    /// The table for `version`.
    pub fn for_version(version: SpecVersion) -> &'static StoryFields {
        match version {
            SpecVersion::V1 => &STORY_V1,
            SpecVersion::V2 => &STORY_V2,
        }
    }
}

/// Apply the detection rules to `record`.
///
/// New identifiers are registered in `seen`; an identifier already present
/// is reported as [`ContentViolation::DuplicateId`]. A blank identifier is
/// reported once as [`ContentViolation::BlankId`] and is not registered.
pub fn validate_detection(
    record: &Value,
    version: SpecVersion,
    seen: &mut SeenIds,
) -> Vec<ContentViolation> {
    let fields = DetectionFields::for_version(version);
    let mut violations = Vec::new();

    check_identity(record, fields.id, fields.name, seen, &mut violations);
    check_ascii_fields(record, fields.ascii, &mut violations);

    if let Some(search) = record.pointer(fields.search).and_then(Value::as_str) {
        let metadata = record.pointer(fields.data_metadata);
        if text::references_data_model(search) {
            if let Some(v) = check_metadata(
                metadata,
                "data_models",
                ContentViolation::DataModelsNotSet,
                ContentViolation::DataModelsEmpty,
            ) {
                violations.push(v);
            }
        }
        if text::references_sourcetype(search) {
            if let Some(v) = check_metadata(
                metadata,
                "data_sourcetypes",
                ContentViolation::SourcetypesNotSet,
                ContentViolation::SourcetypesEmpty,
            ) {
                violations.push(v);
            }
        }
    }

    violations
}

/// Apply the story rules to `record`.
pub fn validate_story(
    record: &Value,
    version: SpecVersion,
    seen: &mut SeenIds,
) -> Vec<ContentViolation> {
    let fields = StoryFields::for_version(version);
    let mut violations = Vec::new();
    check_identity(record, fields.id, fields.name, seen, &mut violations);
    check_ascii_fields(record, fields.ascii, &mut violations);
    violations
}

fn check_identity(
    record: &Value,
    id_ptr: &str,
    name_ptr: &str,
    seen: &mut SeenIds,
    violations: &mut Vec<ContentViolation>,
) {
    if let Some(id) = record.pointer(id_ptr).and_then(Value::as_str) {
        if id.is_empty() {
            violations.push(ContentViolation::BlankId);
        } else if let Err(duplicate) = seen.claim(id) {
            violations.push(duplicate);
        }
    }
    if let Some(name) = record.pointer(name_ptr).and_then(Value::as_str) {
        if text::has_trailing_whitespace(name) {
            violations.push(ContentViolation::TrailingSpaces(name.to_string()));
        }
    }
}

fn check_ascii_fields(
    record: &Value,
    fields: &[(&str, &str)],
    violations: &mut Vec<ContentViolation>,
) {
    for (label, ptr) in fields {
        if let Some(value) = record.pointer(ptr).and_then(Value::as_str) {
            if !text::is_ascii(value) {
                violations.push(ContentViolation::not_ascii(*label));
            }
        }
    }
}

/// Absent and falsy are distinct violations.
fn check_metadata(
    metadata: Option<&Value>,
    key: &str,
    not_set: ContentViolation,
    empty: ContentViolation,
) -> Option<ContentViolation> {
    match metadata.and_then(|m| m.get(key)) {
        None => Some(not_set),
        Some(value) if is_falsy(value) => Some(empty),
        Some(_) => None,
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}`.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
