//! Construction error types.
//!
//! Every error carries the file it concerns so the fail-at-end report can
//! name the offending manifest without further context.

use std::path::PathBuf;

use sctl_core::{ContentType, ContentViolation};
use thiserror::Error;

/// Errors raised while turning one file into one typed object.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file parsed but its top level is not a mapping.
    #[error("expected a mapping at the top level of {path}")]
    NotAMapping { path: PathBuf },

    /// The record does not fit the typed object. `field` names the first
    /// failing field when it can be determined.
    #[error("{path}: {}{reason}", .field.as_deref().map(|f| format!("field '{f}': ")).unwrap_or_default())]
    Deserialize {
        path: PathBuf,
        field: Option<String>,
        reason: String,
    },

    /// The typed object failed its field checks. The first violation is
    /// the headline; all of them are kept.
    #[error("{path}: {}", headline(.violations))]
    Validation {
        path: PathBuf,
        violations: Vec<ContentViolation>,
    },

    /// Another object of the same type already claimed this key.
    #[error("{path}: duplicate {content_type} key '{key}'")]
    DuplicateKey {
        path: PathBuf,
        content_type: ContentType,
        key: String,
    },

    /// A technique id is absent from the enrichment map and cached or
    /// offline data was not allowed.
    #[error("{path}: ATT&CK technique '{technique}' not found in enrichment data")]
    UnknownTechnique { path: PathBuf, technique: String },

    /// A content directory exists but cannot be walked.
    #[error("failed to discover content under {path}: {source}")]
    Discovery {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The enrichment file is unusable.
    #[error("invalid enrichment data at {path}: {reason}")]
    Enrichment { path: PathBuf, reason: String },

    /// `get_object` was called with nothing built.
    #[error("no object has been built since the last reset")]
    NoObject,
}

impl BuildError {
    /// Violations carried by a validation failure; empty otherwise.
    pub fn violations(&self) -> &[ContentViolation] {
        match self {
            Self::Validation { violations, .. } => violations,
            _ => &[],
        }
    }
}

fn headline(violations: &[ContentViolation]) -> String {
    match violations {
        [] => "validation failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// Convenience alias.
pub type BuildResult<T> = Result<T, BuildError>;
