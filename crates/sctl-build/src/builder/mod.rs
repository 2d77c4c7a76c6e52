//! # Builders
//!
//! A builder turns one content file into one typed object. It is stateful
//! for the duration of a single build: [`Builder::reset`] clears it,
//! [`Builder::set_object`] reads and deserializes the file, variant-specific
//! `add_*` steps resolve references and derive fields, and
//! [`Builder::get_object`] validates the result and moves it out.
//!
//! The [`Director`](crate::director::Director) decides which steps run and
//! in which order; builders only know how to perform them.
//!
//! ## Variants
//!
//! | builder              | content                                           |
//! |----------------------|---------------------------------------------------|
//! | [`BasicBuilder<T>`]  | lookups, macros, deployments, investigations, unit tests |
//! | [`BaselineBuilder`]  | baselines (deployment resolution)                 |
//! | [`PlaybookBuilder`]  | playbooks (detection-name normalisation)          |
//! | [`DetectionBuilder`] | detections (all cross-references, derived fields) |
//! | [`StoryBuilder`]     | stories (linked content, author split)            |

mod baseline;
mod basic;
mod detection;
mod playbook;
mod story;

pub use baseline::BaselineBuilder;
pub use basic::BasicBuilder;
pub use detection::DetectionBuilder;
pub use playbook::PlaybookBuilder;
pub use story::StoryBuilder;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use sctl_core::ContentObject;

use crate::error::{BuildError, BuildResult};
use crate::parser;

/// The reset / populate / take cycle shared by every builder.
pub trait Builder {
    /// The object this builder produces.
    type Object;

    /// Discard any partially built object.
    fn reset(&mut self);

    /// Read `path` and deserialize the object from it.
    fn set_object(&mut self, path: &Path) -> BuildResult<()>;

    /// Validate the built object and move it out, leaving the builder empty.
    fn get_object(&mut self) -> BuildResult<Self::Object>;
}

/// The object under construction together with the file it came from.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    inner: Option<(PathBuf, T)>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { inner: None }
    }
}

impl<T: ContentObject + DeserializeOwned> Slot<T> {
    pub(crate) fn clear(&mut self) {
        self.inner = None;
    }

    pub(crate) fn load(&mut self, path: &Path) -> BuildResult<&mut T> {
        self.inner = None;
        let record = parser::load_mapping(path)?;
        let object: T = parser::from_record(path, record)?;
        let (_, object) = self.inner.insert((path.to_path_buf(), object));
        Ok(object)
    }

    /// The object, if `load` succeeded since the last clear.
    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        self.inner.as_mut().map(|(_, object)| object)
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.inner.as_ref().map(|(path, _)| path.as_path())
    }

    pub(crate) fn take_validated(&mut self) -> BuildResult<T> {
        let (path, object) = self.inner.take().ok_or(BuildError::NoObject)?;
        let violations = object.validate();
        if violations.is_empty() {
            Ok(object)
        } else {
            Err(BuildError::Validation { path, violations })
        }
    }
}
