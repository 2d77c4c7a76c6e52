//! # Violation Vocabulary
//!
//! One set of semantic violations shared by the manifest validator (both
//! schema versions) and the typed-object builders. Messages read the same
//! regardless of which pipeline or which spec version produced them, so a
//! content author sees "Blank ID" whether the problem was found while
//! validating a v1 manifest or while building a detection.

use thiserror::Error;

/// A single semantic rule failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentViolation {
    /// The identifier is empty.
    #[error("Blank ID")]
    BlankId,

    /// The identifier was already registered earlier in the run.
    #[error("Duplicate UUID found: {0}")]
    DuplicateId(String),

    /// The identifier is not a UUID.
    #[error("ID is not a valid UUID: '{0}'")]
    InvalidId(String),

    /// The name is empty.
    #[error("Blank name")]
    BlankName,

    /// The name or title ends with whitespace.
    #[error("name has trailing spaces: '{0}'")]
    TrailingSpaces(String),

    /// A free-text field contains non-ASCII characters.
    #[error("{field} not ascii")]
    NotAscii {
        /// Field name as it appears in the source record.
        field: String,
    },

    /// The search uses a data model but `data_models` is absent.
    #[error("The search uses a data model but 'data_models' field is not set")]
    DataModelsNotSet,

    /// The search uses a data model but `data_models` is empty.
    #[error("The search uses a data model but 'data_models' is empty")]
    DataModelsEmpty,

    /// The search names a sourcetype but `data_sourcetypes` is absent.
    #[error("The search specifies a sourcetype but 'data_sourcetypes' field is not set")]
    SourcetypesNotSet,

    /// The search names a sourcetype but `data_sourcetypes` is empty.
    #[error("The search specifies a sourcetype but 'data_sourcetypes' is empty")]
    SourcetypesEmpty,

    /// A required field is absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field is present but its value is unacceptable.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ContentViolation {
    /// Convenience constructor for [`ContentViolation::NotAscii`].
    pub fn not_ascii(field: impl Into<String>) -> Self {
        Self::NotAscii {
            field: field.into(),
        }
    }

    /// Convenience constructor for [`ContentViolation::InvalidField`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_manifest_wording() {
        assert_eq!(ContentViolation::BlankId.to_string(), "Blank ID");
        assert_eq!(
            ContentViolation::DuplicateId("abc".into()).to_string(),
            "Duplicate UUID found: abc"
        );
        assert_eq!(
            ContentViolation::not_ascii("eli5").to_string(),
            "eli5 not ascii"
        );
        assert!(ContentViolation::TrailingSpaces("x ".into())
            .to_string()
            .contains("trailing spaces"));
    }

    #[test]
    fn invalid_field_display_names_field_and_reason() {
        let v = ContentViolation::invalid("confidence", "must be between 0 and 100");
        assert_eq!(v.to_string(), "invalid confidence: must be between 0 and 100");
    }
}
