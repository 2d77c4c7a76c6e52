//! # Content Types — Single Source of Truth
//!
//! Defines the [`ContentType`] enum with all nine kinds of security content.
//! The enum carries, as data, everything the construction pipeline needs to
//! know about a kind: where its files live, its position in the build order,
//! and a human-readable label. Every `match` on it is exhaustive, so adding a
//! kind forces the factory, director and link validator to address it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A category of security-content artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Attack-data driven test definitions for detections.
    UnitTest,
    /// Lookup table definitions.
    Lookup,
    /// Search macros.
    Macro,
    /// Scheduling and alerting configuration.
    Deployment,
    /// Searches that establish normal behaviour.
    Baseline,
    /// Searches run while responding to a detection.
    Investigation,
    /// SOAR playbooks.
    Playbook,
    /// Detection rules.
    Detection,
    /// Narrative groupings of detections, baselines and investigations.
    Story,
}

impl ContentType {
    /// All content types in build order: every type appears after the types
    /// it references.
    pub const BUILD_ORDER: [ContentType; 9] = [
        Self::UnitTest,
        Self::Lookup,
        Self::Macro,
        Self::Deployment,
        Self::Baseline,
        Self::Investigation,
        Self::Playbook,
        Self::Detection,
        Self::Story,
    ];

    /// Return all content types as a slice, in build order.
    pub fn all() -> &'static [ContentType] {
        &Self::BUILD_ORDER
    }

    /// The subdirectory of the content root holding files of this type.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::UnitTest => "tests",
            Self::Lookup => "lookups",
            Self::Macro => "macros",
            Self::Deployment => "deployments",
            Self::Baseline => "baselines",
            Self::Investigation => "investigations",
            Self::Playbook => "playbooks",
            Self::Detection => "detections",
            Self::Story => "stories",
        }
    }

    /// Zero-based position in [`ContentType::BUILD_ORDER`].
    pub fn build_position(&self) -> usize {
        Self::BUILD_ORDER
            .iter()
            .position(|t| t == self)
            .unwrap_or(Self::BUILD_ORDER.len())
    }

    /// Label used in summaries, e.g. `Unit Tests`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnitTest => "Unit Tests",
            Self::Lookup => "Lookups",
            Self::Macro => "Macros",
            Self::Deployment => "Deployments",
            Self::Baseline => "Baselines",
            Self::Investigation => "Investigations",
            Self::Playbook => "Playbooks",
            Self::Detection => "Detections",
            Self::Story => "Stories",
        }
    }

    /// Content types whose collections must be complete before this type
    /// can be constructed.
    pub fn dependencies(&self) -> &'static [ContentType] {
        match self {
            Self::UnitTest | Self::Lookup | Self::Macro | Self::Deployment => &[],
            Self::Investigation | Self::Playbook => &[],
            Self::Baseline => &[Self::Deployment],
            Self::Detection => &[
                Self::UnitTest,
                Self::Lookup,
                Self::Macro,
                Self::Deployment,
                Self::Baseline,
                Self::Playbook,
            ],
            Self::Story => &[Self::Baseline, Self::Investigation, Self::Detection],
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UnitTest => "unit_test",
            Self::Lookup => "lookup",
            Self::Macro => "macro",
            Self::Deployment => "deployment",
            Self::Baseline => "baseline",
            Self::Investigation => "investigation",
            Self::Playbook => "playbook",
            Self::Detection => "detection",
            Self::Story => "story",
        };
        write!(f, "{s}")
    }
}

/// Error returned when parsing an unknown content type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type: {0:?}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.to_string() == s || t.directory() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_precede_dependents() {
        for ty in ContentType::all() {
            for dep in ty.dependencies() {
                assert!(
                    dep.build_position() < ty.build_position(),
                    "{dep} must be built before {ty}"
                );
            }
        }
    }

    #[test]
    fn unit_tests_live_under_tests() {
        assert_eq!(ContentType::UnitTest.directory(), "tests");
        assert_eq!(ContentType::Story.directory(), "stories");
    }

    #[test]
    fn parses_singular_and_directory_names() {
        assert_eq!("detection".parse::<ContentType>().unwrap(), ContentType::Detection);
        assert_eq!("detections".parse::<ContentType>().unwrap(), ContentType::Detection);
        assert_eq!("tests".parse::<ContentType>().unwrap(), ContentType::UnitTest);
        assert!("widgets".parse::<ContentType>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ContentType::UnitTest).unwrap();
        assert_eq!(json, "\"unit_test\"");
    }
}
