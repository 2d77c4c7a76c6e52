use serde::{Deserialize, Serialize};

use super::{check_name, ContentObject};
use crate::content_type::ContentType;
use crate::violation::ContentViolation;

/// One attack dataset replayed during a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackData {
    /// Location of the dataset.
    pub data: String,
    /// Splunk `source` the data is indexed under.
    pub source: String,
    /// Splunk sourcetype the data is indexed under.
    pub sourcetype: String,
    /// Rewrite event timestamps to the replay time.
    #[serde(default)]
    pub update_timestamp: bool,
}

/// A single test case inside a unit test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTestCase {
    /// Test case name.
    pub name: String,
    /// Path of the detection file under test, relative to the content root.
    pub file: String,
    /// Condition the search results must meet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_condition: Option<String>,
    /// Start of the search window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earliest_time: Option<String>,
    /// End of the search window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_time: Option<String>,
    /// Datasets replayed before the search runs.
    #[serde(default)]
    pub attack_data: Vec<AttackData>,
}

/// Attack-data driven tests for one detection, matched to it by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTest {
    /// Name of the detection under test.
    pub name: String,
    /// Test cases, run in order.
    pub tests: Vec<UnitTestCase>,
}

impl ContentObject for UnitTest {
    const CONTENT_TYPE: ContentType = ContentType::UnitTest;

    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Vec<ContentViolation> {
        let mut v = Vec::new();
        check_name(&self.name, &mut v);
        if self.tests.is_empty() {
            v.push(ContentViolation::invalid("tests", "at least one test case is required"));
        }
        for case in &self.tests {
            if case.attack_data.is_empty() {
                v.push(ContentViolation::invalid(
                    "tests.attack_data",
                    format!("test case '{}' has no attack data", case.name),
                ));
            }
        }
        v
    }
}
