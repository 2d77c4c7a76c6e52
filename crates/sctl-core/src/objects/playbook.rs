use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_ascii, check_id, check_name, check_required, ContentObject};
use crate::content_type::ContentType;
use crate::violation::ContentViolation;

/// Tags of a playbook.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybookTags {
    /// Names of the detections this playbook responds to.
    #[serde(default)]
    pub detections: Vec<String>,
    /// SOAR platform labels.
    #[serde(default)]
    pub platform_tags: Vec<String>,
    /// Event fields the playbook reads.
    #[serde(default)]
    pub playbook_fields: Vec<String>,
    /// Products the content ships in.
    #[serde(default)]
    pub product: Vec<String>,
    /// D3FEND technique identifiers.
    #[serde(default)]
    pub defend_technique_id: Vec<String>,
}

/// A SOAR playbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
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
    pub playbook_type: String,
    /// What the object is for.
    pub description: String,
    /// Setup needed before the search returns results.
    #[serde(default)]
    pub how_to_implement: String,
    /// File name of the exported playbook.
    pub playbook: String,
    /// SOAR apps the playbook uses.
    #[serde(default)]
    pub app_list: Vec<String>,
    /// External reference URLs.
    #[serde(default)]
    pub references: Vec<String>,
    /// Classification tags.
    #[serde(default)]
    pub tags: PlaybookTags,
}

impl Playbook {
    /// Whether this playbook responds to the detection named `name`.
    pub fn responds_to(&self, detection_name: &str) -> bool {
        self.tags.detections.iter().any(|d| d == detection_name)
    }
}

impl ContentObject for Playbook {
    const CONTENT_TYPE: ContentType = ContentType::Playbook;

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
        check_required("playbook", &self.playbook, &mut v);
        check_ascii("description", &self.description, &mut v);
        check_ascii("how_to_implement", &self.how_to_implement, &mut v);
        v
    }
}
