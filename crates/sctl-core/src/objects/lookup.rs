use serde::{Deserialize, Serialize};

use super::{check_ascii, check_name, ContentObject};
use crate::content_type::ContentType;
use crate::violation::ContentViolation;

/// A lookup table backed by a CSV file or a KV-store collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    /// Lookup name as used in searches.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// CSV file name, for file-backed lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// KV-store collection, for collection-backed lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Field list, for collection-backed lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_list: Option<String>,
    /// Value returned when nothing matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_match: Option<String>,
    /// Match rules, e.g. `WILDCARD(domain)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    /// Minimum number of matches per input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_matches: Option<u32>,
    /// Whether matching is case sensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive_match: Option<bool>,
}

impl Lookup {
    /// Whether a search token refers to this lookup, either by name or by
    /// its backing file name.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.filename.as_deref() == Some(token)
    }
}

impl ContentObject for Lookup {
    const CONTENT_TYPE: ContentType = ContentType::Lookup;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Vec<ContentViolation> {
        let mut v = Vec::new();
        check_name(&self.name, &mut v);
        check_ascii("description", &self.description, &mut v);
        match (&self.filename, &self.collection) {
            (None, None) => v.push(ContentViolation::MissingField(
                "filename or collection".to_string(),
            )),
            (Some(f), _) if !f.ends_with(".csv") => v.push(ContentViolation::invalid(
                "filename",
                format!("expected a .csv file, got '{f}'"),
            )),
            _ => {}
        }
        v
    }
}
