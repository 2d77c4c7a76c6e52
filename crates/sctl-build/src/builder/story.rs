use std::path::Path;
use std::sync::Arc;

use sctl_core::objects::split_author;
use sctl_core::{Baseline, Detection, Investigation, Story};

use super::{Builder, Slot};
use crate::error::BuildResult;

/// Builder for analytic stories. Stories are built last and link to the
/// detections, baselines and investigations that name them.
#[derive(Debug, Default)]
pub struct StoryBuilder {
    slot: Slot<Story>,
}

impl StoryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `author` into name and company.
    pub fn add_author_info(&mut self) {
        if let Some(story) = self.slot.get_mut() {
            let (name, company) = split_author(&story.author);
            story.author_name = name;
            story.author_company = company;
        }
    }

    /// Link the detections tagged with this story.
    pub fn add_detections(&mut self, detections: &[Arc<Detection>]) {
        if let Some(story) = self.slot.get_mut() {
            story.detections = detections
                .iter()
                .filter(|d| d.in_story(&story.name))
                .cloned()
                .collect();
        }
    }

    /// Link the baselines tagged with this story.
    pub fn add_baselines(&mut self, baselines: &[Arc<Baseline>]) {
        if let Some(story) = self.slot.get_mut() {
            story.baselines = baselines
                .iter()
                .filter(|b| b.tags.analytic_story.contains(&story.name))
                .cloned()
                .collect();
        }
    }

    /// Link the investigations tagged with this story.
    pub fn add_investigations(&mut self, investigations: &[Arc<Investigation>]) {
        if let Some(story) = self.slot.get_mut() {
            story.investigations = investigations
                .iter()
                .filter(|i| i.tags.analytic_story.contains(&story.name))
                .cloned()
                .collect();
        }
    }
}

impl Builder for StoryBuilder {
    type Object = Story;

    fn reset(&mut self) {
        self.slot.clear();
    }

    fn set_object(&mut self, path: &Path) -> BuildResult<()> {
        self.slot.load(path)?;
        Ok(())
    }

    fn get_object(&mut self) -> BuildResult<Story> {
        self.slot.take_validated()
    }
}
