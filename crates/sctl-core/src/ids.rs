//! Run-scoped registry of identifiers already seen for one content type.

use std::collections::HashSet;

use crate::violation::ContentViolation;

/// Accumulator of identifiers seen so far in a run.
///
/// One instance is shared across every record of a content type; the first
/// record to present an identifier claims it and every later record with the
/// same identifier is reported as a duplicate.
#[derive(Debug, Default, Clone)]
pub struct SeenIds {
    ids: HashSet<String>,
}

impl SeenIds {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id`. Returns `false` if it was already present.
    pub fn register(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    /// Register `id`, returning a [`ContentViolation::DuplicateId`] if it was
    /// already present.
    pub fn claim(&mut self, id: &str) -> Result<(), ContentViolation> {
        if self.register(id) {
            Ok(())
        } else {
            Err(ContentViolation::DuplicateId(id.to_string()))
        }
    }

    /// Whether `id` has been registered.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of distinct identifiers registered.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
