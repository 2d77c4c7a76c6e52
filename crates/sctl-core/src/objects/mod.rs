//! # Typed Content Objects
//!
//! One struct per [`ContentType`], deserialized from a raw record with
//! `serde` and then checked with [`ContentObject::validate`]. Fields that are
//! resolved or derived during construction (cross-references, risk scores,
//! source directory) are `#[serde(skip_deserializing)]` so a raw file can
//! never supply them.
//!
//! Cross-references are held as [`Arc`](std::sync::Arc) clones of objects
//! that were built earlier in the run. Built objects are never mutated.

mod baseline;
mod deployment;
mod detection;
mod investigation;
mod lookup;
mod macros;
mod playbook;
mod story;
mod unit_test;

pub use baseline::{Baseline, BaselineTags};
pub use deployment::{AlertAction, Deployment, Scheduling};
pub use detection::{
    AnalyticType, DataMetadata, Detection, DetectionTags, MitreAttackEnrichment,
};
pub use investigation::{Investigation, InvestigationTags};
pub use lookup::Lookup;
pub use macros::Macro;
pub use playbook::{Playbook, PlaybookTags};
pub use story::{Story, StoryTags};
pub use unit_test::{AttackData, UnitTest, UnitTestCase};

use crate::content_type::ContentType;
use crate::text;
use crate::violation::ContentViolation;

/// Behaviour shared by every typed content object.
pub trait ContentObject {
    /// The kind of content this type represents.
    const CONTENT_TYPE: ContentType;

    /// Display name of the object.
    fn name(&self) -> &str;

    /// Identifier, for types that carry one.
    fn id(&self) -> Option<&str> {
        None
    }

    /// Key that must be unique among objects of this type within a run:
    /// the identifier when present, otherwise the name.
    fn unique_key(&self) -> &str {
        self.id().unwrap_or_else(|| self.name())
    }

    /// External reference URLs.
    fn references(&self) -> &[String] {
        &[]
    }

    /// Field-level checks. An empty result means the object is valid.
    fn validate(&self) -> Vec<ContentViolation>;
}

/// Blank / non-UUID identifier checks.
pub(crate) fn check_id(id: &str, violations: &mut Vec<ContentViolation>) {
    if id.is_empty() {
        violations.push(ContentViolation::BlankId);
    } else if uuid::Uuid::parse_str(id).is_err() {
        violations.push(ContentViolation::InvalidId(id.to_string()));
    }
}

/// Blank / trailing-whitespace name checks.
pub(crate) fn check_name(name: &str, violations: &mut Vec<ContentViolation>) {
    if name.trim().is_empty() {
        violations.push(ContentViolation::BlankName);
    } else if text::has_trailing_whitespace(name) {
        violations.push(ContentViolation::TrailingSpaces(name.to_string()));
    }
}

pub(crate) fn check_ascii(field: &str, value: &str, violations: &mut Vec<ContentViolation>) {
    if !text::is_ascii(value) {
        violations.push(ContentViolation::not_ascii(field));
    }
}

pub(crate) fn check_ascii_opt(
    field: &str,
    value: Option<&str>,
    violations: &mut Vec<ContentViolation>,
) {
    if let Some(value) = value {
        check_ascii(field, value, violations);
    }
}

pub(crate) fn check_percentage(
    field: &str,
    value: Option<u32>,
    violations: &mut Vec<ContentViolation>,
) {
    if let Some(v) = value {
        if v > 100 {
            violations.push(ContentViolation::invalid(
                field,
                format!("must be between 0 and 100, got {v}"),
            ));
        }
    }
}

pub(crate) fn check_required(field: &str, value: &str, violations: &mut Vec<ContentViolation>) {
    if value.trim().is_empty() {
        violations.push(ContentViolation::MissingField(field.to_string()));
    }
}

/// Split `"Name, Company"` into its two halves. A missing company yields
/// `None`.
pub fn split_author(author: &str) -> (String, Option<String>) {
    match author.split_once(',') {
        Some((name, company)) => {
            let company = company.trim();
            let company = (!company.is_empty()).then(|| company.to_string());
            (name.trim().to_string(), company)
        }
        None => (author.trim().to_string(), None),
    }
}
