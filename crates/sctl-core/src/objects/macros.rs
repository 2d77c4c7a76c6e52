use serde::{Deserialize, Serialize};

use super::{check_ascii, check_name, check_required, ContentObject};
use crate::content_type::ContentType;
use crate::text;
use crate::violation::ContentViolation;

/// Definition of the generated per-detection filter macro.
pub const FILTER_MACRO_DEFINITION: &str = "search *";

const FILTER_MACRO_DESCRIPTION: &str =
    "Update this macro to limit the output results to filter out false positives.";

/// A search macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    /// Macro name as used between backticks.
    pub name: String,
    /// Expanded search text.
    pub definition: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Argument names, for macros that take arguments.
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl Macro {
    /// Name of the filter macro a detection named `detection_name` uses.
    pub fn filter_name(detection_name: &str) -> String {
        format!("{}_filter", text::snake_case(detection_name))
    }

    /// The default filter macro generated for a detection that does not
    /// ship its own.
    pub fn default_filter(detection_name: &str) -> Self {
        Self {
            name: Self::filter_name(detection_name),
            definition: FILTER_MACRO_DEFINITION.to_string(),
            description: FILTER_MACRO_DESCRIPTION.to_string(),
            arguments: Vec::new(),
        }
    }
}

impl ContentObject for Macro {
    const CONTENT_TYPE: ContentType = ContentType::Macro;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Vec<ContentViolation> {
        let mut v = Vec::new();
        check_name(&self.name, &mut v);
        if self.name.trim().contains(char::is_whitespace) {
            v.push(ContentViolation::invalid("name", "macro names cannot contain whitespace"));
        }
        check_required("definition", &self.definition, &mut v);
        check_ascii("description", &self.description, &mut v);
        v
    }
}
