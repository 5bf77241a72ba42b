//! Request and response bodies of the TestRail API

use iris_common::{CaseId, CollectedTest, ResultStatus, SuiteId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TestRailError, TestRailResult};

/// Entry of `get_projects`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub url: Option<String>,
}

/// Entry of `get_runs/{project_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub suite_id: Option<SuiteId>,
    #[serde(default)]
    pub plan_id: Option<u64>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub passed_count: u64,
    #[serde(default)]
    pub blocked_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub untested_count: u64,
}

/// Entry of `get_tests/{run_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTest {
    pub id: u64,
    pub case_id: CaseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status_id: Option<u64>,
}

/// Body of `add_plan/{project_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanPayload {
    pub name: String,
    pub description: String,
    pub entries: Vec<PlanEntry>,
}

/// One suite of a plan; TestRail creates a run per entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub suite_id: SuiteId,
    pub name: String,
    pub include_all: bool,
    pub case_ids: Vec<CaseId>,
}

/// Run created by `add_plan`, read from `entries[].runs[]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRun {
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub suite_id: Option<SuiteId>,
}

/// Result of a single case as posted to `add_results_for_cases/{run_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPayload {
    pub case_id: CaseId,
    pub status_id: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defects: Option<String>,
}

impl ResultPayload {
    pub fn for_test(test: &CollectedTest) -> Self {
        let status_id = test.status();
        let defects = match status_id {
            ResultStatus::Blocked => test.blocked_by.clone(),
            _ => None,
        };
        Self {
            case_id: test.case_id,
            status_id,
            defects,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsBatch {
    pub results: Vec<ResultPayload>,
}

/// Decode a listing endpoint.
///
/// Older servers answer with a bare array, newer ones wrap the page in an
/// object keyed by the resource name (`{"offset": 0, "projects": [...]}`).
pub fn parse_listing<T: DeserializeOwned>(
    operation: &str,
    key: &str,
    value: Value,
) -> TestRailResult<Vec<T>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut page) => match page.remove(key) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(TestRailError::shape(
                    operation,
                    format!("`{}` is not a list", key),
                ))
            }
            None => {
                return Err(TestRailError::shape(
                    operation,
                    format!("missing `{}`", key),
                ))
            }
        },
        other => {
            return Err(TestRailError::shape(
                operation,
                format!("expected a list, got {}", json_kind(&other)),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| {
                TestRailError::shape(operation, format!("{}[{}]: {}", key, i, e))
            })
        })
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_payload_serialization() {
        let passed = ResultPayload::for_test(&CollectedTest::new(10, 1, "PASSED"));
        assert_eq!(
            serde_json::to_value(&passed).unwrap(),
            json!({"case_id": 1, "status_id": 1})
        );

        let blocked =
            ResultPayload::for_test(&CollectedTest::new(10, 2, "FAILED").blocked_by("1466689"));
        assert_eq!(
            serde_json::to_value(&blocked).unwrap(),
            json!({"case_id": 2, "status_id": 2, "defects": "1466689"})
        );
    }

    #[test]
    fn test_parse_bare_listing() {
        let projects: Vec<Project> = parse_listing(
            "get_projects",
            "projects",
            json!([{"id": 1, "name": "Firefox Desktop"}]),
        )
        .unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Firefox Desktop");
    }

    #[test]
    fn test_parse_paginated_listing() {
        let runs: Vec<RunSummary> = parse_listing(
            "get_runs/1",
            "runs",
            json!({"offset": 0, "limit": 250, "size": 1, "runs": [
                {"id": 7, "name": "Bookmarks", "suite_id": 10, "passed_count": 3}
            ]}),
        )
        .unwrap();
        assert_eq!(runs[0].id, 7);
        assert_eq!(runs[0].suite_id, Some(SuiteId(10)));
        assert_eq!(runs[0].passed_count, 3);
    }

    #[test]
    fn test_reject_malformed_listing() {
        let err = parse_listing::<Project>("get_projects", "projects", json!("nope")).unwrap_err();
        assert!(matches!(err, TestRailError::InvalidResponseShape { .. }));

        let err = parse_listing::<Project>("get_projects", "projects", json!({"size": 0}))
            .unwrap_err();
        assert!(err.to_string().contains("missing `projects`"));

        let err = parse_listing::<Project>("get_projects", "projects", json!([{"id": 1}]))
            .unwrap_err();
        assert!(err.to_string().contains("projects[0]"));
    }
}
