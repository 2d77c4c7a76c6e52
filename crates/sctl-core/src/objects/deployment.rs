use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_ascii, check_id, check_name, ContentObject};
use crate::content_type::ContentType;
use crate::violation::ContentViolation;

/// When and over which window a search runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scheduling {
    /// Cron expression.
    #[serde(default)]
    pub cron_schedule: String,
    /// Start of the search window.
    #[serde(default)]
    pub earliest_time: String,
    /// End of the search window.
    #[serde(default)]
    pub latest_time: String,
    /// Scheduler window, e.g. `auto`.
    #[serde(default)]
    pub schedule_window: String,
}

/// Alert actions enabled for matching searches. Each action carries its own
/// free-form settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertAction {
    /// Notable-event settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notable: Option<serde_json::Value>,
    /// Risk-based alerting settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rba: Option<serde_json::Value>,
    /// E-mail settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<serde_json::Value>,
    /// Slack settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<serde_json::Value>,
    /// SOAR settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phantom: Option<serde_json::Value>,
}

/// Scheduling and alerting configuration applied to the detections and
/// baselines whose attributes match its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Display name.
    pub name: String,
    /// UUID identifier.
    pub id: String,
    /// Date of the last revision.
    pub date: NaiveDate,
    /// Author, optionally as `Name, Company`.
    pub author: String,
    /// What the object is for.
    #[serde(default)]
    pub description: String,
    /// When the matching searches run.
    #[serde(default)]
    pub scheduling: Scheduling,
    /// What fires when they match.
    #[serde(default)]
    pub alert_action: AlertAction,
    /// Attribute name → value that a target must carry for this deployment
    /// to apply, e.g. `type: TTP`.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Deployment {
    /// Whether any tag matches one of the values `attribute_values` yields
    /// for the tag's key.
    pub fn matches<'a, F>(&self, attribute_values: F) -> bool
    where
        F: Fn(&str) -> Vec<&'a str>,
    {
        self.tags
            .iter()
            .any(|(key, wanted)| attribute_values(key).iter().any(|v| v == wanted))
    }
}

impl ContentObject for Deployment {
    const CONTENT_TYPE: ContentType = ContentType::Deployment;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn validate(&self) -> Vec<ContentViolation> {
        let mut v = Vec::new();
        check_id(&self.id, &mut v);
        check_name(&self.name, &mut v);
        check_ascii("description", &self.description, &mut v);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_on_any_tag() {
        let d: Deployment = serde_json::from_value(serde_json::json!({
            "name": "ESCU Default Configuration TTP",
            "id": "fb4c31b0-13e8-4155-8aa5-24de4b8d6717",
            "date": "2021-12-21",
            "author": "Security Team",
            "tags": {"type": "TTP"}
        }))
        .unwrap();
        assert!(d.matches(|k| if k == "type" { vec!["TTP"] } else { vec![] }));
        assert!(!d.matches(|k| if k == "type" { vec!["Hunting"] } else { vec![] }));
        assert!(d.validate().is_empty());
    }
}
