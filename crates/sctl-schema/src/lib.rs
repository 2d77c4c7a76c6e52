//! # sctl-schema — Manifest Validation
//!
//! Validates detection and story manifests in two passes:
//!
//! - **Structural:** the record is checked against the JSON Schema of the
//!   `spec_version` it declares (1 or 2).
//! - **Semantic:** unique identifiers, ASCII prose, trailing-space names and
//!   data-model / sourcetype metadata, expressed once over per-version field
//!   tables.
//!
//! ## Design
//!
//! A schema that cannot be loaded stops validation of its family with a
//! [`SchemaValidationError`]. Everything wrong with an individual manifest
//! becomes a [`ManifestFinding`] so one run reports every problem.

pub mod manifest;
pub mod semantic;
pub mod validate;

// Re-export primary types.
pub use manifest::{validate_family, FindingKind, ManifestFinding, ManifestReport, ManifestValidator};
pub use semantic::{validate_detection, validate_story};
pub use validate::{
    ContentFamily, ManifestSchemas, SchemaValidationError, SpecVersion, StructuralCheck,
    StructuralViolation,
};
