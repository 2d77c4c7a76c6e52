use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    check_ascii, check_id, check_name, Baseline, ContentObject, Detection, Investigation,
};
use crate::content_type::ContentType;
use crate::violation::ContentViolation;

/// Classification tags of a story.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryTags {
    /// Story categories.
    #[serde(default)]
    pub category: Vec<String>,
    /// Products the content ships in.
    #[serde(default)]
    pub product: Vec<String>,
    /// Use case the story supports.
    #[serde(default)]
    pub usecase: Option<String>,
}

/// A narrative grouping of the detections, baselines and investigations
/// that address one threat scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
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
    /// What the object is for.
    pub description: String,
    /// Long-form account of the threat.
    pub narrative: String,
    /// External reference URLs.
    #[serde(default)]
    pub references: Vec<String>,
    /// Classification tags.
    #[serde(default)]
    pub tags: StoryTags,

    /// Author name without the company suffix.
    #[serde(skip_deserializing)]
    pub author_name: String,
    /// Company from the author string, if any.
    #[serde(skip_deserializing)]
    pub author_company: Option<String>,

    /// Detections tagged with this story.
    #[serde(skip_deserializing)]
    pub detections: Vec<Arc<Detection>>,
    /// Baselines tagged with this story.
    #[serde(skip_deserializing)]
    pub baselines: Vec<Arc<Baseline>>,
    /// Investigations tagged with this story.
    #[serde(skip_deserializing)]
    pub investigations: Vec<Arc<Investigation>>,
}

impl Story {
    /// Names of the linked detections, in link order.
    pub fn detection_names(&self) -> Vec<&str> {
        self.detections.iter().map(|d| d.name.as_str()).collect()
    }
}

impl ContentObject for Story {
    const CONTENT_TYPE: ContentType = ContentType::Story;

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
        check_ascii("description", &self.description, &mut v);
        check_ascii("narrative", &self.narrative, &mut v);
        v
    }
}
