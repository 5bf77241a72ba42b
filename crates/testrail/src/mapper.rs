//! Grouping of collected tests by configured suite

use std::collections::HashSet;

use iris_common::{CaseId, CollectedTest, SuiteId, SuiteMap};
use serde::Serialize;

use crate::models::{PlanEntry, ResultPayload, ResultsBatch};

/// Collected tests belonging to one configured suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteGroup {
    pub suite_id: SuiteId,
    pub suite_name: String,
    pub tests: Vec<CollectedTest>,
}

impl SuiteGroup {
    /// Case ids in collection order.
    ///
    /// Both the plan entry and the posted results are derived from this list.
    pub fn case_ids(&self) -> Vec<CaseId> {
        self.tests.iter().map(|t| t.case_id).collect()
    }

    pub fn plan_entry(&self) -> PlanEntry {
        PlanEntry {
            suite_id: self.suite_id,
            name: self.suite_name.clone(),
            include_all: false,
            case_ids: self.case_ids(),
        }
    }

    pub fn results(&self) -> ResultsBatch {
        ResultsBatch {
            results: self.tests.iter().map(ResultPayload::for_test).collect(),
        }
    }
}

/// Group tests by suite, in the order suites are configured.
///
/// Suites without tests are left out, and so are tests whose suite is not
/// configured. A suite id configured under two names is grouped once, under
/// the first name.
pub fn group_by_suite(tests: &[CollectedTest], suites: &SuiteMap) -> Vec<SuiteGroup> {
    let mut seen = HashSet::new();

    suites
        .iter()
        .filter(|(_, suite_id)| seen.insert(*suite_id))
        .filter_map(|(name, suite_id)| {
            let members: Vec<CollectedTest> = tests
                .iter()
                .filter(|t| t.suite_id == suite_id)
                .cloned()
                .collect();
            if members.is_empty() {
                None
            } else {
                Some(SuiteGroup {
                    suite_id,
                    suite_name: name.to_string(),
                    tests: members,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_common::ResultStatus;

    fn suites() -> SuiteMap {
        SuiteMap::parse_literal("{'Bookmarks': 10, 'History': 20}").unwrap()
    }

    #[test]
    fn test_group_bookmarks_and_history() {
        let tests = vec![
            CollectedTest::new(10, 1, "PASSED"),
            CollectedTest::new(20, 2, "FAILED: x"),
        ];

        let groups = group_by_suite(&tests, &suites());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].suite_name, "Bookmarks");
        assert_eq!(groups[0].case_ids(), vec![CaseId(1)]);
        assert_eq!(groups[1].suite_name, "History");
        assert_eq!(groups[1].case_ids(), vec![CaseId(2)]);

        let results = groups[1].results().results;
        assert_eq!(results[0].case_id, CaseId(2));
        assert_eq!(results[0].status_id, ResultStatus::Failed);
    }

    #[test]
    fn test_group_follows_configured_order() {
        let tests = vec![
            CollectedTest::new(20, 5, "PASSED"),
            CollectedTest::new(10, 3, "PASSED"),
            CollectedTest::new(20, 4, "PASSED"),
        ];

        let groups = group_by_suite(&tests, &suites());
        let ids: Vec<_> = groups.iter().map(|g| g.suite_id).collect();
        assert_eq!(ids, vec![SuiteId(10), SuiteId(20)]);
        // Input order is kept inside a group
        assert_eq!(groups[1].case_ids(), vec![CaseId(5), CaseId(4)]);

        assert_eq!(groups, group_by_suite(&tests, &suites()));
    }

    #[test]
    fn test_group_skips_empty_and_unknown_suites() {
        let tests = vec![
            CollectedTest::new(20, 2, "PASSED"),
            CollectedTest::new(99, 7, "PASSED"),
        ];

        let groups = group_by_suite(&tests, &suites());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].suite_name, "History");
        assert!(group_by_suite(&[], &suites()).is_empty());
    }

    #[test]
    fn test_group_duplicate_suite_id_once() {
        let suites = SuiteMap::parse_literal("{'Bookmarks': 10, 'Bookmarks Toolbar': 10}").unwrap();
        let tests = vec![CollectedTest::new(10, 1, "PASSED")];

        let groups = group_by_suite(&tests, &suites);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].suite_name, "Bookmarks");
    }

    #[test]
    fn test_plan_entry_matches_results() {
        let tests = vec![
            CollectedTest::new(10, 1, "PASSED"),
            CollectedTest::new(10, 2, "ERROR").blocked_by("1234"),
        ];
        let group = &group_by_suite(&tests, &suites())[0];

        let entry = group.plan_entry();
        assert!(!entry.include_all);
        let posted: Vec<_> = group.results().results.iter().map(|r| r.case_id).collect();
        assert_eq!(entry.case_ids, posted);
    }
}
