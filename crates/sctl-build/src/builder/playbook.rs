use std::path::Path;

use sctl_core::Playbook;

use super::{Builder, Slot};
use crate::error::BuildResult;

/// Builder for playbooks.
#[derive(Debug, Default)]
pub struct PlaybookBuilder {
    slot: Slot<Playbook>,
}

impl PlaybookBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trim and deduplicate `tags.detections` so name matching against
    /// detections is exact.
    pub fn add_detection_names(&mut self) {
        if let Some(playbook) = self.slot.get_mut() {
            let mut names: Vec<String> = Vec::with_capacity(playbook.tags.detections.len());
            for name in playbook.tags.detections.drain(..) {
                let name = name.trim().to_string();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
            }
            playbook.tags.detections = names;
        }
    }
}

impl Builder for PlaybookBuilder {
    type Object = Playbook;

    fn reset(&mut self) {
        self.slot.clear();
    }

    fn set_object(&mut self, path: &Path) -> BuildResult<()> {
        self.slot.load(path)?;
        Ok(())
    }

    fn get_object(&mut self) -> BuildResult<Playbook> {
        self.slot.take_validated()
    }
}
