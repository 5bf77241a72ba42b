//! Core types for Iris test reporting

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};

/// TestRail suite identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SuiteId(pub u64);

/// TestRail case identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CaseId(pub u64);

impl std::fmt::Display for SuiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SuiteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_id(s).map(SuiteId)
    }
}

impl FromStr for CaseId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_id(s).map(CaseId)
    }
}

impl<'de> Deserialize<'de> for SuiteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        numeric_id(deserializer).map(SuiteId)
    }
}

impl<'de> Deserialize<'de> for CaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        numeric_id(deserializer).map(CaseId)
    }
}

fn parse_id(text: &str) -> Result<u64> {
    text.trim()
        .parse()
        .map_err(|_| Error::InvalidId(text.to_string()))
}

/// Ids arrive either as JSON numbers or as the strings test markers carry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(u64),
    Text(String),
}

fn numeric_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    match RawValue::deserialize(deserializer)? {
        RawValue::Number(n) => Ok(n),
        RawValue::Text(s) => parse_id(&s).map_err(serde::de::Error::custom),
    }
}

fn optional_reference<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<RawValue>::deserialize(deserializer)?.map(|raw| match raw {
        RawValue::Number(n) => n.to_string(),
        RawValue::Text(s) => s,
    }))
}

/// Outcome of a test case as understood by TestRail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    Passed,
    Blocked,
    Failed,
}

impl ResultStatus {
    /// Remote `status_id` value
    pub fn id(self) -> u8 {
        match self {
            ResultStatus::Passed => 1,
            ResultStatus::Blocked => 2,
            ResultStatus::Failed => 5,
        }
    }

    pub fn from_id(id: u64) -> Option<Self> {
        match id {
            1 => Some(ResultStatus::Passed),
            2 => Some(ResultStatus::Blocked),
            5 => Some(ResultStatus::Failed),
            _ => None,
        }
    }

    /// A blocking reference wins over the outcome; otherwise any outcome
    /// mentioning `FAILED` or `ERROR` is a failure.
    pub fn for_test(test: &CollectedTest) -> Self {
        if test.blocked_by.is_some() {
            ResultStatus::Blocked
        } else if test.outcome.contains("FAILED") || test.outcome.contains("ERROR") {
            ResultStatus::Failed
        } else {
            ResultStatus::Passed
        }
    }
}

impl Serialize for ResultStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultStatus::Passed => write!(f, "passed"),
            ResultStatus::Blocked => write!(f, "blocked"),
            ResultStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A completed test as handed over by the test runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedTest {
    #[serde(default)]
    pub description: String,

    #[serde(alias = "test_suite_id")]
    pub suite_id: SuiteId,

    /// Bug reference blocking this test, if any
    #[serde(default, deserialize_with = "optional_reference")]
    pub blocked_by: Option<String>,

    #[serde(alias = "test_case_id")]
    pub case_id: CaseId,

    /// Raw runner outcome, e.g. `PASSED` or `FAILED: assertion`
    pub outcome: String,
}

impl CollectedTest {
    pub fn new(suite_id: u64, case_id: u64, outcome: impl Into<String>) -> Self {
        Self {
            description: String::new(),
            suite_id: SuiteId(suite_id),
            blocked_by: None,
            case_id: CaseId(case_id),
            outcome: outcome.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn blocked_by(mut self, reference: impl Into<String>) -> Self {
        self.blocked_by = Some(reference.into());
        self
    }

    pub fn status(&self) -> ResultStatus {
        ResultStatus::for_test(self)
    }
}

/// Build metadata of the browser under test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    /// Build id, e.g. `20180704003137`
    pub fx_build_id: String,
    /// Version, e.g. `61.0.3`
    pub fx_version: String,
}

/// Everything a finished test session reports: build info plus its tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRun {
    #[serde(flatten)]
    pub build: BuildContext,

    #[serde(default)]
    pub completed_tests: Vec<CollectedTest>,
}

impl CompletedRun {
    /// Parse a completed run from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::from)
    }

    /// Read a completed run from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let run = Self::from_json(&content)?;
        debug!(
            "Loaded {} completed test(s) from {}",
            run.completed_tests.len(),
            path.display()
        );
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_precedence() {
        let blocked = CollectedTest::new(10, 1, "FAILED: x").blocked_by("1487123");
        assert_eq!(blocked.status(), ResultStatus::Blocked);

        let failed = CollectedTest::new(10, 2, "FAILED: x");
        assert_eq!(failed.status(), ResultStatus::Failed);

        let errored = CollectedTest::new(10, 3, "ERROR");
        assert_eq!(errored.status(), ResultStatus::Failed);

        let passed = CollectedTest::new(10, 4, "PASSED");
        assert_eq!(passed.status(), ResultStatus::Passed);

        // Matching is case-sensitive
        let lower = CollectedTest::new(10, 5, "failed");
        assert_eq!(lower.status(), ResultStatus::Passed);
    }

    #[test]
    fn test_status_ids() {
        assert_eq!(ResultStatus::Passed.id(), 1);
        assert_eq!(ResultStatus::Blocked.id(), 2);
        assert_eq!(ResultStatus::Failed.id(), 5);
        assert_eq!(ResultStatus::from_id(5), Some(ResultStatus::Failed));
        assert_eq!(ResultStatus::from_id(3), None);
        assert_eq!(serde_json::to_string(&ResultStatus::Blocked).unwrap(), "2");
    }

    #[test]
    fn test_parse_marker_record() {
        let json = r#"{
            "description": "Users can customize the download location",
            "test_case_id": "143567",
            "test_suite_id": "2241",
            "blocked_by": null,
            "outcome": "PASSED"
        }"#;
        let test: CollectedTest = serde_json::from_str(json).unwrap();
        assert_eq!(test.case_id, CaseId(143567));
        assert_eq!(test.suite_id, SuiteId(2241));
        assert!(test.blocked_by.is_none());
    }

    #[test]
    fn test_parse_numeric_blocked_by() {
        let json = r#"{"suite_id": 1, "case_id": 2, "blocked_by": 1466689, "outcome": "PASSED"}"#;
        let test: CollectedTest = serde_json::from_str(json).unwrap();
        assert_eq!(test.blocked_by.as_deref(), Some("1466689"));
        assert_eq!(test.status(), ResultStatus::Blocked);
    }

    #[test]
    fn test_reject_non_numeric_id() {
        let json = r#"{"suite_id": "bookmarks", "case_id": 2, "outcome": "PASSED"}"#;
        assert!(serde_json::from_str::<CollectedTest>(json).is_err());
        assert!("abc".parse::<CaseId>().is_err());
        assert_eq!(" 42 ".parse::<CaseId>().unwrap(), CaseId(42));
    }

    #[test]
    fn test_completed_run_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{
                "fx_build_id": "20180704003137",
                "fx_version": "61.0.3",
                "completed_tests": [
                    {"suite_id": 10, "case_id": 1, "outcome": "PASSED"}
                ]
            }"#,
        )
        .unwrap();

        let run = CompletedRun::from_file(&path).unwrap();
        assert_eq!(run.build.fx_build_id, "20180704003137");
        assert_eq!(run.build.fx_version, "61.0.3");
        assert_eq!(run.completed_tests.len(), 1);
    }
}
