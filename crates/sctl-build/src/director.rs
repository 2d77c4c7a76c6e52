//! The director: which builder steps run, and in what order, for each
//! content type.
//!
//! The director holds no state. It resets the builder, loads the file and
//! applies the steps; the caller then takes the object with
//! [`Builder::get_object`].

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use sctl_core::{
    Baseline, ContentObject, Deployment, Detection, Investigation, Lookup, Macro, Playbook,
    UnitTest,
};

use crate::builder::{
    BaselineBuilder, BasicBuilder, Builder, DetectionBuilder, PlaybookBuilder, StoryBuilder,
};
use crate::enrichment::AttackEnrichment;
use crate::error::BuildResult;

/// Everything a detection may reference, borrowed from the collections
/// built earlier in the run.
#[derive(Debug, Clone, Copy)]
pub struct DetectionDeps<'a> {
    /// Deployments, matched by tag.
    pub deployments: &'a [Arc<Deployment>],
    /// Playbooks, linked by detection name.
    pub playbooks: &'a [Arc<Playbook>],
    /// Baselines, linked by detection name.
    pub baselines: &'a [Arc<Baseline>],
    /// Unit tests, linked by name.
    pub tests: &'a [Arc<UnitTest>],
    /// Macros the search may use.
    pub macros: &'a [Arc<Macro>],
    /// Lookups the search may use.
    pub lookups: &'a [Arc<Lookup>],
    /// ATT&CK data for `tags.mitre_attack_id`.
    pub enrichment: &'a AttackEnrichment,
    /// Tolerate techniques missing from `enrichment`.
    pub force_cached_or_offline: bool,
}

/// Stateless sequencer of builder steps.
#[derive(Debug, Default, Clone, Copy)]
pub struct Director;

impl Director {
    fn construct_basic<T>(&self, builder: &mut BasicBuilder<T>, path: &Path) -> BuildResult<()>
    where
        T: ContentObject + DeserializeOwned,
    {
        builder.reset();
        builder.set_object(path)
    }

    /// Build a unit test from `path`.
    pub fn construct_test(&self, builder: &mut BasicBuilder<UnitTest>, path: &Path) -> BuildResult<()> {
        self.construct_basic(builder, path)
    }

    /// Build a lookup from `path`.
    pub fn construct_lookup(&self, builder: &mut BasicBuilder<Lookup>, path: &Path) -> BuildResult<()> {
        self.construct_basic(builder, path)
    }

    /// Build a macro from `path`.
    pub fn construct_macro(&self, builder: &mut BasicBuilder<Macro>, path: &Path) -> BuildResult<()> {
        self.construct_basic(builder, path)
    }

    /// Build a deployment from `path`.
    pub fn construct_deployment(
        &self,
        builder: &mut BasicBuilder<Deployment>,
        path: &Path,
    ) -> BuildResult<()> {
        self.construct_basic(builder, path)
    }

    /// Build an investigation from `path`.
    pub fn construct_investigation(
        &self,
        builder: &mut BasicBuilder<Investigation>,
        path: &Path,
    ) -> BuildResult<()> {
        self.construct_basic(builder, path)
    }

    /// Build a playbook and normalise its detection names.
    pub fn construct_playbook(&self, builder: &mut PlaybookBuilder, path: &Path) -> BuildResult<()> {
        builder.reset();
        builder.set_object(path)?;
        builder.add_detection_names();
        Ok(())
    }

    /// Build a baseline and attach its deployment.
    pub fn construct_baseline(
        &self,
        builder: &mut BaselineBuilder,
        path: &Path,
        deployments: &[Arc<Deployment>],
    ) -> BuildResult<()> {
        builder.reset();
        builder.set_object(path)?;
        builder.add_deployment(deployments);
        Ok(())
    }

    /// Build a detection and resolve everything it references.
    pub fn construct_detection(
        &self,
        builder: &mut DetectionBuilder,
        path: &Path,
        deps: DetectionDeps<'_>,
    ) -> BuildResult<()> {
        builder.reset();
        builder.set_object(path)?;
        builder.add_deployment(deps.deployments);
        builder.add_playbooks(deps.playbooks);
        builder.add_baselines(deps.baselines);
        builder.add_unit_test(deps.tests);
        builder.add_mitre_attack_enrichment(deps.enrichment, deps.force_cached_or_offline)?;
        builder.add_macros(deps.macros);
        builder.add_lookups(deps.lookups);
        Ok(())
    }

    /// Build a story and link the content tagged with its name.
    pub fn construct_story(
        &self,
        builder: &mut StoryBuilder,
        path: &Path,
        detections: &[Arc<Detection>],
        baselines: &[Arc<Baseline>],
        investigations: &[Arc<Investigation>],
    ) -> BuildResult<()> {
        builder.reset();
        builder.set_object(path)?;
        builder.add_author_info();
        builder.add_detections(detections);
        builder.add_baselines(baselines);
        builder.add_investigations(investigations);
        Ok(())
    }
}
