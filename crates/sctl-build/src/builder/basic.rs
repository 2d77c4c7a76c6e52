use std::path::Path;

use serde::de::DeserializeOwned;

use sctl_core::ContentObject;

use super::{Builder, Slot};
use crate::error::BuildResult;

/// Builder for content with no cross-references: the object is exactly what
/// the file says, once it passes validation.
#[derive(Debug)]
pub struct BasicBuilder<T> {
    slot: Slot<T>,
}

impl<T> BasicBuilder<T> {
    /// An empty builder.
    pub fn new() -> Self {
        Self {
            slot: Slot::default(),
        }
    }
}

impl<T> Default for BasicBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ContentObject + DeserializeOwned> Builder for BasicBuilder<T> {
    type Object = T;

    fn reset(&mut self) {
        self.slot.clear();
    }

    fn set_object(&mut self, path: &Path) -> BuildResult<()> {
        self.slot.load(path)?;
        Ok(())
    }

    fn get_object(&mut self) -> BuildResult<T> {
        self.slot.take_validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use sctl_core::{Lookup, Macro};
    use std::fs;

    #[test]
    fn builds_and_empties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctime.yml");
        fs::write(&path, "name: security_content_ctime\ndefinition: convert timeformat=x ctime($field$)\narguments: [field]\n").unwrap();

        let mut b = BasicBuilder::<Macro>::new();
        b.set_object(&path).unwrap();
        let m = b.get_object().unwrap();
        assert_eq!(m.arguments, vec!["field".to_string()]);
        assert!(matches!(b.get_object(), Err(BuildError::NoObject)));
    }

    #[test]
    fn deserialize_error_names_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yml");
        fs::write(&path, "name: no_definition\n").unwrap();
        let mut b = BasicBuilder::<Macro>::new();
        match b.set_object(&path) {
            Err(BuildError::Deserialize { field, .. }) => {
                assert_eq!(field.as_deref(), Some("definition"));
            }
            other => panic!("expected Deserialize, got {other:?}"),
        }
    }

    #[test]
    fn validation_failure_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("l.yml");
        fs::write(&path, "name: users\ndescription: d\n").unwrap();
        let mut b = BasicBuilder::<Lookup>::new();
        b.set_object(&path).unwrap();
        match b.get_object() {
            Err(BuildError::Validation { path: p, violations }) => {
                assert_eq!(p, path);
                assert_eq!(violations.len(), 1);
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn reset_discards_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yml");
        fs::write(&path, "name: m\ndefinition: index=main\n").unwrap();
        let mut b = BasicBuilder::<Macro>::new();
        b.set_object(&path).unwrap();
        b.reset();
        assert!(matches!(b.get_object(), Err(BuildError::NoObject)));
    }
}
