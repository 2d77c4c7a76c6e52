//! Shared YAML/JSON loading.
//!
//! Every content file goes through [`load_record`], which returns a
//! `serde_json::Value` regardless of the source format. Builders and the
//! enrichment loader then deserialize typed objects from that one value
//! model, so YAML-specific types never reach the domain layer.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BuildError, BuildResult};

/// Load a content file as a JSON value. `.json` files are parsed as JSON,
/// everything else as YAML.
pub fn load_record(path: &Path) -> BuildResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        return serde_json::from_str(&content).map_err(|source| BuildError::JsonParse {
            path: path.to_path_buf(),
            source,
        });
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|source| BuildError::YamlParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(yaml_to_json_value(yaml))
}

/// Load a content file whose top level must be a mapping.
pub fn load_mapping(path: &Path) -> BuildResult<Value> {
    let value = load_record(path)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(BuildError::NotAMapping {
            path: path.to_path_buf(),
        })
    }
}

/// Deserialize a typed object from a record, naming the failing field when
/// serde reports one.
pub fn from_record<T: DeserializeOwned>(path: &Path, record: Value) -> BuildResult<T> {
    serde_json::from_value(record).map_err(|e| {
        let reason = e.to_string();
        BuildError::Deserialize {
            path: path.to_path_buf(),
            field: failing_field(&reason),
            reason,
        }
    })
}

/// serde quotes the offending field in backticks for missing, unknown and
/// duplicate fields.
fn failing_field(reason: &str) -> Option<String> {
    let field_msg = ["missing field `", "unknown field `", "duplicate field `"]
        .iter()
        .find_map(|prefix| reason.find(prefix).map(|at| &reason[at + prefix.len()..]))?;
    field_msg.split('`').next().map(str::to_string)
}

/// Convert a serde_yaml::Value to a serde_json::Value.
///
/// YAML timestamps are already strings in serde_yaml's model. Tags are
/// stripped; non-string keys are rendered as strings.
fn yaml_to_json_value(yaml: serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_json_value).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => format!("{other:?}"),
                };
                obj.insert(key, yaml_to_json_value(v));
            }
            Value::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn yaml_dates_stay_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.yml");
        fs::write(&path, "name: x\ndate: 2021-04-29\nversion: 3\n").unwrap();
        let v = load_record(&path).unwrap();
        assert_eq!(v["date"], "2021-04-29");
        assert_eq!(v["version"], 3);
    }

    #[test]
    fn json_extension_parsed_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        fs::write(&path, r#"{"name": "x"}"#).unwrap();
        assert_eq!(load_record(&path).unwrap()["name"], "x");
    }

    #[test]
    fn scalar_document_is_not_a_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.yml");
        fs::write(&path, "just a string\n").unwrap();
        assert!(matches!(load_mapping(&path), Err(BuildError::NotAMapping { .. })));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "name: [unclosed\n").unwrap();
        match load_record(&path) {
            Err(BuildError::YamlParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected YamlParse, got {other:?}"),
        }
    }

    #[test]
    fn failing_field_extracted() {
        assert_eq!(
            failing_field("missing field `search` at line 1"),
            Some("search".to_string())
        );
        assert_eq!(failing_field("invalid type: integer"), None);
    }
}
