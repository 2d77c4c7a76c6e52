use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_ascii, check_ascii_opt, check_id, check_name, check_required, ContentObject};
use crate::content_type::ContentType;
use crate::violation::ContentViolation;

/// Classification tags of an investigation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvestigationTags {
    /// Stories this object belongs to.
    #[serde(default)]
    pub analytic_story: Vec<String>,
    /// Products the content ships in.
    #[serde(default)]
    pub product: Vec<String>,
    /// Event fields the search needs.
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Security domain, e.g. `endpoint` or `network`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_domain: Option<String>,
}

/// A search run while responding to a detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    /// Display name.
    pub name: String,
    /// UUID identifier.
    pub id: String,
    /// Revision number.
    pub version: u32,
    /// Date of the last revision.
    pub date: NaiveDate,
    /// Author, optionally as `Name, Company`.
    pub author: String,
    /// Free-form type label.
    #[serde(rename = "type", default)]
    pub investigation_type: String,
    /// Data models the search reads from.
    #[serde(default)]
    pub datamodel: Vec<String>,
    /// What the object is for.
    pub description: String,
    /// Search text.
    pub search: String,
    /// Setup needed before the search returns results.
    #[serde(default)]
    pub how_to_implement: String,
    /// Benign activity that may also match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_false_positives: Option<String>,
    /// External reference URLs.
    #[serde(default)]
    pub references: Vec<String>,
    /// Search tokens to substitute with values from the triggering event.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Classification tags.
    #[serde(default)]
    pub tags: InvestigationTags,
}

impl ContentObject for Investigation {
    const CONTENT_TYPE: ContentType = ContentType::Investigation;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn references(&self) -> &[String] {
        &self.references
    }

    fn validate(&self) -> Vec<ContentViolation> {
        let mut v = Vec::new();
        check_id(&self.id, &mut v);
        check_name(&self.name, &mut v);
        check_required("search", &self.search, &mut v);
        check_ascii("description", &self.description, &mut v);
        check_ascii("how_to_implement", &self.how_to_implement, &mut v);
        check_ascii_opt("known_false_positives", self.known_false_positives.as_deref(), &mut v);
        v
    }
}
