use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    check_ascii, check_ascii_opt, check_id, check_name, check_required, ContentObject, Deployment,
};
use crate::content_type::ContentType;
use crate::violation::ContentViolation;

/// Classification tags of a baseline.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaselineTags {
    /// Stories this object belongs to.
    #[serde(default)]
    pub analytic_story: Vec<String>,
    /// Names of the detections that consume this baseline's output.
    #[serde(default)]
    pub detections: Vec<String>,
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

/// A search that establishes normal behaviour for one or more detections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
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
    pub baseline_type: String,
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
    /// Classification tags.
    #[serde(default)]
    pub tags: BaselineTags,

    /// Resolved from the deployment collection.
    #[serde(skip_deserializing)]
    pub deployment: Option<Arc<Deployment>>,
}

impl Baseline {
    /// Values of a named attribute, used for deployment matching.
    pub fn attribute_values(&self, key: &str) -> Vec<&str> {
        match key {
            "name" => vec![self.name.as_str()],
            "id" => vec![self.id.as_str()],
            "type" => vec![self.baseline_type.as_str()],
            "analytic_story" => self.tags.analytic_story.iter().map(String::as_str).collect(),
            "product" => self.tags.product.iter().map(String::as_str).collect(),
            "security_domain" => self.tags.security_domain.as_deref().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Whether this baseline feeds the detection named `detection_name`.
    pub fn feeds(&self, detection_name: &str) -> bool {
        self.tags.detections.iter().any(|d| d == detection_name)
    }
}

impl ContentObject for Baseline {
    const CONTENT_TYPE: ContentType = ContentType::Baseline;

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
