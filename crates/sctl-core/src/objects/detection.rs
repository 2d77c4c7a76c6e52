//! # Detections
//!
//! The richest content object: a search plus the metadata describing what it
//! detects, what data it needs, and how it is deployed. Besides the fields
//! read from the source file, a detection carries references to objects
//! built earlier in the run (deployment, playbooks, baselines, unit test,
//! macros, lookups) and fields derived during construction.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    check_ascii, check_ascii_opt, check_id, check_name, check_percentage, check_required,
    Baseline, ContentObject, Deployment, Lookup, Macro, Playbook, UnitTest,
};
use crate::content_type::ContentType;
use crate::text;
use crate::violation::ContentViolation;

/// Analytic type of a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalyticType {
    /// Tactics, techniques and procedures; alerts directly.
    #[serde(rename = "TTP", alias = "ttp")]
    Ttp,
    /// Unusual activity that contributes risk without alerting.
    #[serde(alias = "anomaly")]
    Anomaly,
    /// Broad search for analysts to review.
    #[serde(alias = "hunting")]
    Hunting,
    /// Combines the results of other detections.
    #[serde(alias = "correlation")]
    Correlation,
    /// Streaming analytics of the SSA content family.
    #[serde(rename = "streaming", alias = "Streaming")]
    Streaming,
}

impl AnalyticType {
    /// Name as written in content files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ttp => "TTP",
            Self::Anomaly => "Anomaly",
            Self::Hunting => "Hunting",
            Self::Correlation => "Correlation",
            Self::Streaming => "streaming",
        }
    }
}

impl std::fmt::Display for AnalyticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data the search needs. `None` and an empty list are distinct: the first
/// means the author never declared the field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataMetadata {
    /// Data models the search requires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_models: Option<Vec<String>>,
    /// Sourcetypes the search requires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_sourcetypes: Option<Vec<String>>,
    /// Products that produce the data.
    #[serde(default)]
    pub providing_technologies: Vec<String>,
}

/// Classification and scoring tags of a detection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionTags {
    /// Stories this object belongs to.
    #[serde(default)]
    pub analytic_story: Vec<String>,
    /// Kind of asset the detection watches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    /// Confidence in the finding, 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u32>,
    /// Impact of the activity, 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<u32>,
    /// Explicit risk score, 0 to 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u32>,
    /// Risk message template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// ATT&CK technique identifiers.
    #[serde(default)]
    pub mitre_attack_id: Vec<String>,
    /// Related CVE identifiers.
    #[serde(default)]
    pub cve: Vec<String>,
    /// Products the content ships in.
    #[serde(default)]
    pub product: Vec<String>,
    /// Event fields the search needs.
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Security domain, e.g. `endpoint` or `network`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_domain: Option<String>,
    /// Kill chain phases covered.
    #[serde(default)]
    pub kill_chain_phases: Vec<String>,
    /// Any tag not modelled above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// ATT&CK context for one technique referenced by a detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitreAttackEnrichment {
    /// ATT&CK technique identifiers.
    pub mitre_attack_id: String,
    /// Technique name.
    pub mitre_attack_technique: String,
    /// Tactics the technique serves.
    #[serde(default)]
    pub mitre_attack_tactics: Vec<String>,
    /// Groups known to use it.
    #[serde(default)]
    pub mitre_attack_groups: Vec<String>,
}

/// A detection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
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
    /// Analytic type.
    #[serde(rename = "type")]
    pub detection_type: AnalyticType,
    /// What the object is for.
    pub description: String,
    /// Plain-language explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eli5: Option<String>,
    /// Search text.
    pub search: String,
    /// Setup needed before the search returns results.
    #[serde(default)]
    pub how_to_implement: String,
    /// Benign activity that may also match.
    #[serde(default)]
    pub known_false_positives: String,
    /// External reference URLs.
    #[serde(default)]
    pub references: Vec<String>,
    /// Data the search needs.
    #[serde(default)]
    pub data_metadata: DataMetadata,
    /// Classification tags.
    #[serde(default)]
    pub tags: DetectionTags,
    /// Retired, not shipped.
    #[serde(default)]
    pub deprecated: bool,
    /// Not yet production quality.
    #[serde(default)]
    pub experimental: bool,

    // Derived during construction.
    /// File the detection was read from.
    #[serde(skip_deserializing)]
    pub file_path: PathBuf,
    /// Parent directory name, e.g. `endpoint`.
    #[serde(skip_deserializing)]
    pub source: String,
    /// Data models the search reads from.
    #[serde(skip_deserializing)]
    pub datamodels: Vec<String>,
    /// `tags.risk_score` if given, otherwise `confidence * impact / 100`.
    #[serde(skip_deserializing)]
    pub effective_risk_score: Option<u32>,

    // Resolved during construction.
    /// Deployment whose tags match, last match wins.
    #[serde(skip_deserializing)]
    pub deployment: Option<Arc<Deployment>>,
    /// Playbooks responding to this detection.
    #[serde(skip_deserializing)]
    pub playbooks: Vec<Arc<Playbook>>,
    /// Baselines feeding this detection.
    #[serde(skip_deserializing)]
    pub baselines: Vec<Arc<Baseline>>,
    /// Unit test named after this detection.
    #[serde(skip_deserializing)]
    pub test: Option<Arc<UnitTest>>,
    /// Macros the search uses, filter macro last.
    #[serde(skip_deserializing)]
    pub macros: Vec<Arc<Macro>>,
    /// Lookups the search reads or writes.
    #[serde(skip_deserializing)]
    pub lookups: Vec<Arc<Lookup>>,
    /// ATT&CK context per resolved technique.
    #[serde(skip_deserializing)]
    pub mitre_attack_enrichments: Vec<MitreAttackEnrichment>,
    /// Macros used by the search that no built macro answers to.
    #[serde(skip_deserializing)]
    pub unresolved_macros: Vec<String>,
    /// Lookups used by the search that no built lookup answers to.
    #[serde(skip_deserializing)]
    pub unresolved_lookups: Vec<String>,
}

impl Detection {
    /// Values of a named attribute, used for deployment matching.
    pub fn attribute_values(&self, key: &str) -> Vec<&str> {
        match key {
            "name" => vec![self.name.as_str()],
            "id" => vec![self.id.as_str()],
            "type" => vec![self.detection_type.as_str()],
            "source" => vec![self.source.as_str()],
            "analytic_story" => self.tags.analytic_story.iter().map(String::as_str).collect(),
            "product" => self.tags.product.iter().map(String::as_str).collect(),
            "mitre_attack_id" => self.tags.mitre_attack_id.iter().map(String::as_str).collect(),
            "asset_type" => self.tags.asset_type.as_deref().into_iter().collect(),
            "security_domain" => self.tags.security_domain.as_deref().into_iter().collect(),
            other => match self.tags.extra.get(other) {
                Some(serde_json::Value::String(s)) => vec![s.as_str()],
                Some(serde_json::Value::Array(items)) => {
                    items.iter().filter_map(|i| i.as_str()).collect()
                }
                _ => Vec::new(),
            },
        }
    }

    /// Whether the detection belongs to the story named `story_name`.
    pub fn in_story(&self, story_name: &str) -> bool {
        self.tags.analytic_story.iter().any(|s| s == story_name)
    }

    /// Whether the detection should ship: neither deprecated nor experimental.
    pub fn is_production(&self) -> bool {
        !self.deprecated && !self.experimental
    }

    fn check_data_metadata(&self, v: &mut Vec<ContentViolation>) {
        if text::references_data_model(&self.search) {
            match &self.data_metadata.data_models {
                None => v.push(ContentViolation::DataModelsNotSet),
                Some(models) if models.is_empty() => v.push(ContentViolation::DataModelsEmpty),
                Some(_) => {}
            }
        }
        if text::references_sourcetype(&self.search) {
            match &self.data_metadata.data_sourcetypes {
                None => v.push(ContentViolation::SourcetypesNotSet),
                Some(st) if st.is_empty() => v.push(ContentViolation::SourcetypesEmpty),
                Some(_) => {}
            }
        }
    }
}

impl ContentObject for Detection {
    const CONTENT_TYPE: ContentType = ContentType::Detection;

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
        check_ascii_opt("eli5", self.eli5.as_deref(), &mut v);
        check_ascii("how_to_implement", &self.how_to_implement, &mut v);
        check_ascii("known_false_positives", &self.known_false_positives, &mut v);
        check_ascii_opt("tags.message", self.tags.message.as_deref(), &mut v);
        check_percentage("tags.confidence", self.tags.confidence, &mut v);
        check_percentage("tags.impact", self.tags.impact, &mut v);
        check_percentage("tags.risk_score", self.tags.risk_score, &mut v);
        self.check_data_metadata(&mut v);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detection(overrides: serde_json::Value) -> Detection {
        let mut base = json!({
            "name": "Suspicious Login",
            "id": "5d4ac0a2-7bb3-4b4f-9a23-0b7e5d5c0a11",
            "version": 1,
            "date": "2022-03-01",
            "author": "Jane Doe, Example Corp",
            "type": "TTP",
            "description": "Detects logins from unusual places.",
            "search": "index=auth action=success | stats count by user",
            "how_to_implement": "Ingest authentication logs.",
            "known_false_positives": "Travelling users.",
            "tags": {"analytic_story": ["Account Takeover"], "confidence": 80, "impact": 50}
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn well_formed_detection_is_valid() {
        assert!(detection(json!({})).validate().is_empty());
    }

    #[test]
    fn blank_id_and_trailing_name_both_reported() {
        let d = detection(json!({"id": "", "name": "Suspicious Login "}));
        let v = d.validate();
        assert!(v.contains(&ContentViolation::BlankId));
        assert!(v
            .iter()
            .any(|e| e.to_string().contains("trailing spaces")));
    }

    #[test]
    fn tstats_requires_data_models() {
        let d = detection(json!({
            "search": "| tstats count from datamodel=Endpoint.Processes",
            "data_metadata": {"data_models": []}
        }));
        assert_eq!(d.validate(), vec![ContentViolation::DataModelsEmpty]);

        let d = detection(json!({"search": "| tstats count from datamodel=Endpoint.Processes"}));
        assert_eq!(d.validate(), vec![ContentViolation::DataModelsNotSet]);
    }

    #[test]
    fn sourcetype_requires_data_sourcetypes() {
        let d = detection(json!({
            "search": "sourcetype=WinEventLog | stats count",
            "data_metadata": {"data_sourcetypes": ["WinEventLog"]}
        }));
        assert!(d.validate().is_empty());
    }

    #[test]
    fn non_ascii_fields_reported_individually() {
        let d = detection(json!({
            "description": "caf\u{e9}",
            "known_false_positives": "na\u{ef}ve"
        }));
        assert_eq!(
            d.validate(),
            vec![
                ContentViolation::not_ascii("description"),
                ContentViolation::not_ascii("known_false_positives"),
            ]
        );
    }

    #[test]
    fn unknown_tags_are_kept_and_matchable() {
        let d = detection(json!({"tags": {"cis20": ["CIS 10"], "custom": "yes"}}));
        assert_eq!(d.attribute_values("custom"), vec!["yes"]);
        assert_eq!(d.attribute_values("cis20"), vec!["CIS 10"]);
        assert_eq!(d.attribute_values("type"), vec!["TTP"]);
    }

    #[test]
    fn confidence_out_of_range() {
        let d = detection(json!({"tags": {"confidence": 180}}));
        assert_eq!(d.validate().len(), 1);
    }
}
