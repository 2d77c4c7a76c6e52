//! ATT&CK enrichment data.
//!
//! A mapping of technique id to technique name, tactics and groups. The data
//! is produced by an external collaborator and read from a YAML or JSON file
//! shaped like:
//!
//! ```yaml
//! T1078:
//!   mitre_attack_technique: Valid Accounts
//!   mitre_attack_tactics: [Defense Evasion, Persistence]
//!   mitre_attack_groups: [APT28]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use sctl_core::MitreAttackEnrichment;

use crate::error::{BuildError, BuildResult};
use crate::parser;

#[derive(Debug, Deserialize)]
struct TechniqueEntry {
    mitre_attack_technique: String,
    #[serde(default)]
    mitre_attack_tactics: Vec<String>,
    #[serde(default)]
    mitre_attack_groups: Vec<String>,
}

/// Technique id → enrichment record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackEnrichment {
    techniques: BTreeMap<String, MitreAttackEnrichment>,
}

impl AttackEnrichment {
    /// An empty mapping. Detections built against it carry no enrichment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the mapping from a YAML or JSON file.
    pub fn load(path: &Path) -> BuildResult<Self> {
        let record = parser::load_mapping(path)?;
        let entries: BTreeMap<String, TechniqueEntry> =
            serde_json::from_value(record).map_err(|e| BuildError::Enrichment {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let enrichment: Self = entries
            .into_iter()
            .map(|(id, entry)| MitreAttackEnrichment {
                mitre_attack_id: id,
                mitre_attack_technique: entry.mitre_attack_technique,
                mitre_attack_tactics: entry.mitre_attack_tactics,
                mitre_attack_groups: entry.mitre_attack_groups,
            })
            .collect();
        tracing::info!(path = %path.display(), techniques = enrichment.len(), "loaded ATT&CK enrichment");
        Ok(enrichment)
    }

    /// Look up one technique.
    pub fn get(&self, technique_id: &str) -> Option<&MitreAttackEnrichment> {
        self.techniques.get(technique_id)
    }

    /// Number of techniques.
    pub fn len(&self) -> usize {
        self.techniques.len()
    }

    /// Whether no technique is known.
    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }
}

impl FromIterator<MitreAttackEnrichment> for AttackEnrichment {
    fn from_iter<I: IntoIterator<Item = MitreAttackEnrichment>>(iter: I) -> Self {
        Self {
            techniques: iter
                .into_iter()
                .map(|e| (e.mitre_attack_id.clone(), e))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attack.yml");
        std::fs::write(
            &path,
            "T1078:\n  mitre_attack_technique: Valid Accounts\n  mitre_attack_tactics: [Persistence]\n",
        )
        .unwrap();
        let e = AttackEnrichment::load(&path).unwrap();
        assert_eq!(e.len(), 1);
        let t = e.get("T1078").unwrap();
        assert_eq!(t.mitre_attack_id, "T1078");
        assert_eq!(t.mitre_attack_tactics, vec!["Persistence".to_string()]);
        assert!(t.mitre_attack_groups.is_empty());
    }

    #[test]
    fn entry_without_technique_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attack.yml");
        std::fs::write(&path, "T1078:\n  mitre_attack_tactics: [Persistence]\n").unwrap();
        assert!(matches!(
            AttackEnrichment::load(&path),
            Err(BuildError::Enrichment { .. })
        ));
    }
}
