use std::path::Path;
use std::sync::Arc;

use sctl_core::{Baseline, Deployment};

use super::{Builder, Slot};
use crate::error::BuildResult;

/// Builder for baselines, which resolve their deployment the same way
/// detections do.
#[derive(Debug, Default)]
pub struct BaselineBuilder {
    slot: Slot<Baseline>,
}

impl BaselineBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the last deployment whose tags match the baseline.
    pub fn add_deployment(&mut self, deployments: &[Arc<Deployment>]) {
        if let Some(baseline) = self.slot.get_mut() {
            let found = deployments
                .iter()
                .rev()
                .find(|d| d.matches(|key| baseline.attribute_values(key)))
                .cloned();
            baseline.deployment = found;
        }
    }
}

impl Builder for BaselineBuilder {
    type Object = Baseline;

    fn reset(&mut self) {
        self.slot.clear();
    }

    fn set_object(&mut self, path: &Path) -> BuildResult<()> {
        self.slot.load(path)?;
        Ok(())
    }

    fn get_object(&mut self) -> BuildResult<Baseline> {
        self.slot.take_validated()
    }
}
