//! # Structural Manifest Validation
//!
//! Validates raw detection and story manifests against the JSON Schema of
//! the spec version they declare. Each content family ships two schemas
//! (`spec_version` 1 and 2) located by convention under `spec/` in the
//! content root:
//!
//! | family    | version 1                             | version 2                    |
//! |-----------|---------------------------------------|------------------------------|
//! | detection | `spec/v1/detection_search.json.spec`  | `spec/v2/detections.spec.json` |
//! | story     | `spec/v1/analytic_story.json.spec`    | `spec/v2/story.spec.json`    |
//!
//! ## Design
//!
//! [`ManifestSchemas`] loads and compiles both schemas of a family once per
//! run. A schema that cannot be read or compiled is a configuration error
//! and is returned immediately as [`SchemaValidationError`]; it is never
//! folded into per-record results. Per-record problems, including a missing
//! or unknown `spec_version`, come back as [`StructuralViolation`]s.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Fatal errors raised while preparing or running validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The schema file could not be read or parsed.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoadError {
        /// Path of the schema that failed to load.
        path: PathBuf,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The schema parsed but could not be compiled into a validator.
    #[error("failed to compile schema {path}: {reason}")]
    SchemaCompileError {
        /// Path of the schema.
        path: PathBuf,
        /// Human-readable reason.
        reason: String,
    },

    /// The manifest directory could not be listed.
    #[error("failed to read manifest directory {path}: {source}")]
    ManifestDirectory {
        /// Directory that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// A structural problem with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralViolation {
    /// JSON Pointer to the offending value (empty for the document root).
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl StructuralViolation {
    fn at_root(message: impl Into<String>) -> Self {
        Self {
            instance_path: String::new(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StructuralViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (at {})", self.message, self.instance_path)
        }
    }
}

// ---------------------------------------------------------------------------
// Families and versions
// ---------------------------------------------------------------------------

/// Content families that carry versioned manifest schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFamily {
    /// Detection manifests.
    Detection,
    /// Analytic story manifests.
    Story,
}

impl ContentFamily {
    /// Schema location relative to the content root.
    pub fn schema_path(&self, version: SpecVersion) -> &'static str {
        match (self, version) {
            (Self::Detection, SpecVersion::V1) => "spec/v1/detection_search.json.spec",
            (Self::Detection, SpecVersion::V2) => "spec/v2/detections.spec.json",
            (Self::Story, SpecVersion::V1) => "spec/v1/analytic_story.json.spec",
            (Self::Story, SpecVersion::V2) => "spec/v2/story.spec.json",
        }
    }

    /// Directory holding the family's manifests, relative to the content root.
    pub fn manifest_dir(&self) -> &'static str {
        match self {
            Self::Detection => "detections",
            Self::Story => "stories",
        }
    }
}

impl std::fmt::Display for ContentFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detection => f.write_str("detection"),
            Self::Story => f.write_str("story"),
        }
    }
}

/// Schema generation a record conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    /// First-generation manifests (`search_id`, `search_name`, ...).
    V1,
    /// Second-generation manifests (`id`, `name`, `detect.splunk`, ...).
    V2,
}

impl SpecVersion {
    /// Read the `spec_version` a record declares.
    pub fn of(record: &Value) -> Result<Self, StructuralViolation> {
        match record.get("spec_version") {
            None | Some(Value::Null) => Err(StructuralViolation::at_root(
                "record does not contain a spec_version, which is required",
            )),
            Some(v) => match v.as_u64() {
                Some(1) => Ok(Self::V1),
                Some(2) => Ok(Self::V2),
                _ => Err(StructuralViolation {
                    instance_path: "/spec_version".to_string(),
                    message: format!("unrecognized spec_version {v}, expected 1 or 2"),
                }),
            },
        }
    }

    /// Numeric form.
    pub fn number(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// ManifestSchemas
// ---------------------------------------------------------------------------

/// Outcome of a structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralCheck {
    /// Declared version, when it was readable and recognized.
    pub version: Option<SpecVersion>,
    /// Every structural violation found. Empty means valid.
    pub violations: Vec<StructuralViolation>,
}

impl StructuralCheck {
    /// Whether the record passed.
    pub fn is_valid(&self) -> bool {
        self.version.is_some() && self.violations.is_empty()
    }
}

/// Compiled version 1 and version 2 schemas of one content family.
pub struct ManifestSchemas {
    family: ContentFamily,
    v1: jsonschema::Validator,
    v2: jsonschema::Validator,
}

impl std::fmt::Debug for ManifestSchemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestSchemas")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl ManifestSchemas {
    /// Load both schemas of `family` from their conventional locations under
    /// `content_root`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::SchemaLoadError`] if either file is
    /// missing or not JSON, and [`SchemaValidationError::SchemaCompileError`]
    /// if either is not a usable JSON Schema.
    pub fn load(content_root: &Path, family: ContentFamily) -> Result<Self, SchemaValidationError> {
        let v1_path = content_root.join(family.schema_path(SpecVersion::V1));
        let v2_path = content_root.join(family.schema_path(SpecVersion::V2));
        let v1 = compile(&v1_path, &read_schema(&v1_path)?)?;
        let v2 = compile(&v2_path, &read_schema(&v2_path)?)?;
        tracing::debug!(%family, v1 = %v1_path.display(), v2 = %v2_path.display(), "loaded manifest schemas");
        Ok(Self { family, v1, v2 })
    }

    /// Build from in-memory schema documents.
    pub fn from_values(
        family: ContentFamily,
        v1: &Value,
        v2: &Value,
    ) -> Result<Self, SchemaValidationError> {
        Ok(Self {
            family,
            v1: compile(Path::new(family.schema_path(SpecVersion::V1)), v1)?,
            v2: compile(Path::new(family.schema_path(SpecVersion::V2)), v2)?,
        })
    }

    /// The family these schemas belong to.
    pub fn family(&self) -> ContentFamily {
        self.family
    }

    /// Check `record` against the schema of the version it declares.
    pub fn check(&self, record: &Value) -> StructuralCheck {
        let version = match SpecVersion::of(record) {
            Ok(v) => v,
            Err(violation) => {
                return StructuralCheck {
                    version: None,
                    violations: vec![violation],
                }
            }
        };
        let validator = match version {
            SpecVersion::V1 => &self.v1,
            SpecVersion::V2 => &self.v2,
        };
        let violations = validator
            .iter_errors(record)
            .map(|err| StructuralViolation {
                instance_path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        StructuralCheck {
            version: Some(version),
            violations,
        }
    }
}

fn read_schema(path: &Path) -> Result<Value, SchemaValidationError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| SchemaValidationError::SchemaLoadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    serde_json::from_str(&content).map_err(|e| SchemaValidationError::SchemaLoadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn compile(path: &Path, schema: &Value) -> Result<jsonschema::Validator, SchemaValidationError> {
    jsonschema::options()
        .build(schema)
        .map_err(|e| SchemaValidationError::SchemaCompileError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
