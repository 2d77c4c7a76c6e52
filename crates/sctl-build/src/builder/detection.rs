use std::path::{Component, Path};
use std::sync::Arc;

use sctl_core::{
    text, Baseline, Deployment, Detection, Lookup, Macro, Playbook, UnitTest,
};

use super::{Builder, Slot};
use crate::enrichment::AttackEnrichment;
use crate::error::{BuildError, BuildResult};

/// Macros provided by apps outside the content tree.
const EXTERNAL_MACROS: [&str; 1] = ["drop_dm_object_name"];

/// Builder for detections.
///
/// `set_object` fills the fields derivable from the file alone (source
/// directory, data models, status, risk score); the `add_*` steps resolve
/// references against collections built earlier in the run.
#[derive(Debug, Default)]
pub struct DetectionBuilder {
    slot: Slot<Detection>,
}

impl DetectionBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the last deployment whose tags match the detection.
    pub fn add_deployment(&mut self, deployments: &[Arc<Deployment>]) {
        if let Some(det) = self.slot.get_mut() {
            let found = deployments
                .iter()
                .rev()
                .find(|d| d.matches(|key| det.attribute_values(key)))
                .cloned();
            det.deployment = found;
        }
    }

    /// Attach every playbook that responds to this detection.
    pub fn add_playbooks(&mut self, playbooks: &[Arc<Playbook>]) {
        if let Some(det) = self.slot.get_mut() {
            det.playbooks = playbooks
                .iter()
                .filter(|p| p.responds_to(&det.name))
                .cloned()
                .collect();
        }
    }

    /// Attach every baseline that feeds this detection.
    pub fn add_baselines(&mut self, baselines: &[Arc<Baseline>]) {
        if let Some(det) = self.slot.get_mut() {
            det.baselines = baselines
                .iter()
                .filter(|b| b.feeds(&det.name))
                .cloned()
                .collect();
        }
    }

    /// Attach the unit test named after this detection.
    pub fn add_unit_test(&mut self, tests: &[Arc<UnitTest>]) {
        if let Some(det) = self.slot.get_mut() {
            det.test = tests.iter().find(|t| t.name == det.name).cloned();
        }
    }

    /// Resolve `tags.mitre_attack_id` through the enrichment map.
    ///
    /// An empty map means no enrichment is available and nothing is
    /// resolved. Otherwise a missing technique is an error unless
    /// `force_cached_or_offline` is set, in which case it is only logged.
    pub fn add_mitre_attack_enrichment(
        &mut self,
        enrichment: &AttackEnrichment,
        force_cached_or_offline: bool,
    ) -> BuildResult<()> {
        let path = self.slot.path().map(Path::to_path_buf);
        let Some(det) = self.slot.get_mut() else {
            return Ok(());
        };
        if enrichment.is_empty() {
            return Ok(());
        }
        let mut resolved = Vec::with_capacity(det.tags.mitre_attack_id.len());
        for technique in &det.tags.mitre_attack_id {
            match enrichment.get(technique) {
                Some(e) => resolved.push(e.clone()),
                None if force_cached_or_offline => {
                    tracing::warn!(detection = %det.name, %technique, "technique missing from enrichment data");
                }
                None => {
                    return Err(BuildError::UnknownTechnique {
                        path: path.unwrap_or_default(),
                        technique: technique.clone(),
                    })
                }
            }
        }
        det.mitre_attack_enrichments = resolved;
        Ok(())
    }

    /// Resolve the backtick macros in the search by name and attach the
    /// `<name>_filter` macro, generating the default one when the run has
    /// none. Names nothing answers to are recorded as unresolved.
    pub fn add_macros(&mut self, macros: &[Arc<Macro>]) {
        let Some(det) = self.slot.get_mut() else {
            return;
        };
        let filter_name = Macro::filter_name(&det.name);
        let mut attached = Vec::new();
        let mut unresolved = Vec::new();

        for name in text::extract_macros(&det.search) {
            if name == filter_name || EXTERNAL_MACROS.contains(&name.as_str()) {
                continue;
            }
            match macros.iter().find(|m| m.name == name) {
                Some(m) => attached.push(Arc::clone(m)),
                None => unresolved.push(name),
            }
        }

        let filter = macros
            .iter()
            .find(|m| m.name == filter_name)
            .cloned()
            .unwrap_or_else(|| Arc::new(Macro::default_filter(&det.name)));
        attached.push(filter);

        det.macros = attached;
        det.unresolved_macros = unresolved;
    }

    /// Resolve the lookups the search reads or writes, by name or file name.
    pub fn add_lookups(&mut self, lookups: &[Arc<Lookup>]) {
        let Some(det) = self.slot.get_mut() else {
            return;
        };
        let mut attached = Vec::new();
        let mut unresolved = Vec::new();
        for token in text::extract_lookups(&det.search) {
            match lookups.iter().find(|l| l.answers_to(&token)) {
                Some(l) if !attached.iter().any(|a: &Arc<Lookup>| Arc::ptr_eq(a, l)) => {
                    attached.push(Arc::clone(l))
                }
                Some(_) => {}
                None => unresolved.push(token),
            }
        }
        det.lookups = attached;
        det.unresolved_lookups = unresolved;
    }
}

impl Builder for DetectionBuilder {
    type Object = Detection;

    fn reset(&mut self) {
        self.slot.clear();
    }

    fn set_object(&mut self, path: &Path) -> BuildResult<()> {
        let det = self.slot.load(path)?;
        det.file_path = path.to_path_buf();
        det.source = path
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        det.datamodels = text::extract_datamodels(&det.search);
        det.deprecated |= in_directory(path, "deprecated");
        det.experimental |= in_directory(path, "experimental");
        det.effective_risk_score = det.tags.risk_score.or_else(|| {
            let confidence = det.tags.confidence?;
            let impact = det.tags.impact?;
            // Out-of-range inputs are rejected by validation, not here.
            confidence.checked_mul(impact).map(|p| p / 100)
        });
        Ok(())
    }

    fn get_object(&mut self) -> BuildResult<Detection> {
        self.slot.take_validated()
    }
}

fn in_directory(path: &Path, name: &str) -> bool {
    path.parent().is_some_and(|dir| {
        dir.components()
            .any(|c| matches!(c, Component::Normal(n) if n == name))
    })
}
