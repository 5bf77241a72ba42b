//! Plan creation and result synchronization
//!
//! A synchronization walks through these stages, aborting on the first error:
//!
//! ```text
//! BuildingPayload -> Submitted -> RunsResolved -> ResultsPosted -> Done
//! ```
//!
//! Nothing is rolled back on failure. A plan that was created stays on the
//! server, as do results posted for earlier runs.

use iris_common::{BuildContext, CollectedTest, ResultStatus, SuiteId, SuiteMap};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::client::ApiClient;
use crate::config::TestRailConfig;
use crate::error::{TestRailError, TestRailResult};
use crate::format::{plan_name, run_description};
use crate::mapper::{group_by_suite, SuiteGroup};
use crate::models::{
    json_kind, parse_listing, PlanPayload, Project, RemoteRun, RemoteTest, RunSummary,
};

/// Stage of a plan synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    BuildingPayload,
    Submitted,
    RunsResolved,
    ResultsPosted,
    Done,
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStage::BuildingPayload => write!(f, "building_payload"),
            SyncStage::Submitted => write!(f, "submitted"),
            SyncStage::RunsResolved => write!(f, "runs_resolved"),
            SyncStage::ResultsPosted => write!(f, "results_posted"),
            SyncStage::Done => write!(f, "done"),
        }
    }
}

/// Immutable names fixed at the start of a synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSession {
    pub project_name: String,
    pub plan_name: String,
}

/// A plan ready to be submitted, together with the groups it was built from
#[derive(Debug, Clone, Serialize)]
pub struct PreparedPlan {
    pub session: SyncSession,
    pub groups: Vec<SuiteGroup>,
    pub payload: PlanPayload,
}

impl PreparedPlan {
    /// Group the tests by suite and build the `add_plan` body, dated today
    pub fn build(
        project_name: &str,
        suites: &SuiteMap,
        build: &BuildContext,
        tests: &[CollectedTest],
    ) -> Self {
        let session = SyncSession {
            project_name: project_name.to_string(),
            plan_name: plan_name(&build.fx_version),
        };
        debug!("Creating Test Plan {}", session.plan_name);

        let groups = group_by_suite(tests, suites);
        let payload = PlanPayload {
            name: session.plan_name.clone(),
            description: run_description(&build.fx_build_id, &build.fx_version),
            entries: groups.iter().map(SuiteGroup::plan_entry).collect(),
        };

        Self {
            session,
            groups,
            payload,
        }
    }
}

/// Results posted into one run
#[derive(Debug, Clone, Serialize)]
pub struct PostedRun {
    pub run_id: u64,
    pub run_name: String,
    pub suite_id: SuiteId,
    pub suite_name: String,
    pub passed: usize,
    pub blocked: usize,
    pub failed: usize,
}

impl PostedRun {
    fn new(run_id: u64, run_name: &str, group: &SuiteGroup) -> Self {
        let count = |status: ResultStatus| group.tests.iter().filter(|t| t.status() == status).count();
        Self {
            run_id,
            run_name: run_name.to_string(),
            suite_id: group.suite_id,
            suite_name: group.suite_name.clone(),
            passed: count(ResultStatus::Passed),
            blocked: count(ResultStatus::Blocked),
            failed: count(ResultStatus::Failed),
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.blocked + self.failed
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultsSummary {
    pub posted: Vec<PostedRun>,
    /// Runs no configured suite matched
    pub skipped_runs: Vec<String>,
}

/// Outcome of a completed synchronization
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub plan_name: String,
    pub plan_id: Option<u64>,
    #[serde(flatten)]
    pub results: ResultsSummary,
}

/// TestRail reporting client for one project and suite map
pub struct TestRail {
    client: ApiClient,
    project_name: String,
    suites: SuiteMap,
}

impl TestRail {
    /// Create a client from validated configuration
    pub fn new(config: &TestRailConfig) -> TestRailResult<Self> {
        config.validate()?;
        info!("Starting TestRail reporting.");
        Ok(Self::with_client(
            config.client()?,
            config.project_name.clone(),
            config.suite_dictionary.clone(),
        ))
    }

    pub fn with_client(client: ApiClient, project_name: impl Into<String>, suites: SuiteMap) -> Self {
        Self {
            client,
            project_name: project_name.into(),
            suites,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn suites(&self) -> &SuiteMap {
        &self.suites
    }

    /// Retrieve all projects
    pub async fn get_all_projects(&self) -> TestRailResult<Vec<Project>> {
        let operation = "get_projects";
        let response = self
            .client
            .send_get(operation)
            .await
            .map_err(|e| TestRailError::remote(operation, e))?;
        parse_listing(operation, "projects", response)
    }

    /// Id of the first project named exactly `project_name`
    pub async fn resolve_project_id(&self, project_name: &str) -> TestRailResult<Option<u64>> {
        let projects = self.get_all_projects().await?;
        let project_id = projects
            .iter()
            .find(|p| p.name == project_name)
            .map(|p| p.id);
        if project_id.is_none() {
            warn!("Project not found: {}", project_name);
        }
        Ok(project_id)
    }

    async fn require_project_id(&self, project_name: &str) -> TestRailResult<u64> {
        self.resolve_project_id(project_name)
            .await?
            .ok_or_else(|| TestRailError::ProjectNotFound(project_name.to_string()))
    }

    /// Retrieve all runs of a project
    pub async fn get_all_runs(&self, project_name: &str) -> TestRailResult<Vec<RunSummary>> {
        let project_id = self.require_project_id(project_name).await?;
        let operation = format!("get_runs/{}", project_id);
        let response = self
            .client
            .send_get(&operation)
            .await
            .map_err(|e| TestRailError::remote(operation.as_str(), e))?;
        parse_listing(&operation, "runs", response)
    }

    /// Id of the run named exactly `run_name`.
    ///
    /// A missing run is logged and reported as `None`, not as an error.
    pub async fn resolve_run_id(
        &self,
        project_name: &str,
        run_name: &str,
    ) -> TestRailResult<Option<u64>> {
        let runs = self.get_all_runs(project_name).await?;
        match runs.iter().find(|r| r.name == run_name) {
            Some(run) => Ok(Some(run.id)),
            None => {
                error!("Test run not found: {}", run_name);
                Ok(None)
            }
        }
    }

    /// Retrieve all tests of a run
    pub async fn get_tests_from_run(
        &self,
        project_name: &str,
        run_name: &str,
    ) -> TestRailResult<Vec<RemoteTest>> {
        let run_id = self
            .resolve_run_id(project_name, run_name)
            .await?
            .ok_or_else(|| TestRailError::RunNotFound {
                project: project_name.to_string(),
                run: run_name.to_string(),
            })?;

        let operation = format!("get_tests/{}", run_id);
        let response = self
            .client
            .send_get(&operation)
            .await
            .map_err(|e| TestRailError::remote(operation.as_str(), e))?;
        parse_listing(&operation, "tests", response)
    }

    /// Group the tests and build the plan payload without contacting the server
    pub fn prepare(&self, build: &BuildContext, tests: &[CollectedTest]) -> PreparedPlan {
        PreparedPlan::build(&self.project_name, &self.suites, build, tests)
    }

    /// Create a plan with one run per suite and post every test result into it
    pub async fn create_test_plan(
        &self,
        build: &BuildContext,
        tests: &[CollectedTest],
    ) -> TestRailResult<SyncReport> {
        let plan = self.prepare(build, tests);
        self.submit(plan).await
    }

    pub async fn submit(&self, plan: PreparedPlan) -> TestRailResult<SyncReport> {
        let PreparedPlan {
            session,
            groups,
            payload,
        } = plan;
        debug!(
            stage = %SyncStage::BuildingPayload,
            "Plan {} has {} suite entries",
            session.plan_name,
            payload.entries.len()
        );
        if groups.is_empty() {
            warn!("No collected test belongs to a configured suite");
        }

        let project_id = self.require_project_id(&session.project_name).await?;
        let operation = format!("add_plan/{}", project_id);
        let response = self
            .client
            .send_post(&operation, &payload)
            .await
            .map_err(|e| TestRailError::remote(operation.as_str(), e))?;
        info!("Test plan {} was successfully created", session.plan_name);
        debug!(stage = %SyncStage::Submitted, "add_plan accepted");

        let plan_id = response.get("id").and_then(Value::as_u64);
        let runs = parse_plan_runs(&operation, &response)?;
        debug!(stage = %SyncStage::RunsResolved, "{} run(s) created", runs.len());

        let results = self.add_test_results(&runs, &groups).await?;
        debug!(
            stage = %SyncStage::ResultsPosted,
            "{} run(s) updated, {} skipped",
            results.posted.len(),
            results.skipped_runs.len()
        );

        debug!(stage = %SyncStage::Done, "Synchronization of {} finished", session.plan_name);
        Ok(SyncReport {
            plan_name: session.plan_name,
            plan_id,
            results,
        })
    }

    /// Post the results of each group into the run created for it.
    ///
    /// Runs no group matches are skipped. The first failing post aborts the
    /// remaining runs.
    pub async fn add_test_results(
        &self,
        runs: &[RemoteRun],
        groups: &[SuiteGroup],
    ) -> TestRailResult<ResultsSummary> {
        let mut summary = ResultsSummary::default();

        for run in runs {
            let Some(group) = match_suite_group(run, groups) else {
                warn!("No configured suite matches test run {}, skipping", run.name);
                summary.skipped_runs.push(run.name.clone());
                continue;
            };
            let run_id = run
                .id
                .ok_or_else(|| TestRailError::InvalidRunId(run.name.clone()))?;

            let operation = format!("add_results_for_cases/{}", run_id);
            self.client
                .send_post(&operation, &group.results())
                .await
                .map_err(|e| TestRailError::remote(format!("{} ({})", operation, run.name), e))?;
            info!("Successfully added test results in test run name: {}", run.name);

            summary.posted.push(PostedRun::new(run_id, &run.name, group));
        }

        Ok(summary)
    }
}

/// Flatten `entries[].runs[]` of an `add_plan` response, checking every level
pub fn parse_plan_runs(operation: &str, response: &Value) -> TestRailResult<Vec<RemoteRun>> {
    let plan = response.as_object().ok_or_else(|| {
        TestRailError::shape(
            operation,
            format!("expected an object, got {}", json_kind(response)),
        )
    })?;

    let entries = match plan.get("entries") {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(TestRailError::shape(
                operation,
                format!("`entries` is {}, expected a list", json_kind(other)),
            ))
        }
        None => return Err(TestRailError::shape(operation, "missing `entries`")),
    };

    let mut runs = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let entry = entry.as_object().ok_or_else(|| {
            TestRailError::shape(
                operation,
                format!("entries[{}] is {}, expected an object", i, json_kind(entry)),
            )
        })?;

        let entry_runs = match entry.get("runs") {
            Some(Value::Array(entry_runs)) => entry_runs,
            Some(other) => {
                return Err(TestRailError::shape(
                    operation,
                    format!("entries[{}].runs is {}, expected a list", i, json_kind(other)),
                ))
            }
            None => {
                return Err(TestRailError::shape(
                    operation,
                    format!("entries[{}] is missing `runs`", i),
                ))
            }
        };

        for (j, run) in entry_runs.iter().enumerate() {
            if !run.is_object() {
                return Err(TestRailError::shape(
                    operation,
                    format!(
                        "entries[{}].runs[{}] is {}, expected an object",
                        i,
                        j,
                        json_kind(run)
                    ),
                ));
            }
            let run: RemoteRun = serde_json::from_value(run.clone()).map_err(|e| {
                TestRailError::shape(operation, format!("entries[{}].runs[{}]: {}", i, j, e))
            })?;
            runs.push(run);
        }
    }

    Ok(runs)
}

/// Pick the group a created run belongs to.
///
/// The run's `suite_id` decides when TestRail returns one that was planned.
/// Otherwise the run name must contain the suite name (case-sensitive); when
/// several suite names fit, the longest wins.
pub fn match_suite_group<'a>(run: &RemoteRun, groups: &'a [SuiteGroup]) -> Option<&'a SuiteGroup> {
    if let Some(suite_id) = run.suite_id {
        if let Some(group) = groups.iter().find(|g| g.suite_id == suite_id) {
            return Some(group);
        }
    }

    groups
        .iter()
        .filter(|g| run.name.contains(g.suite_name.as_str()))
        .min_by_key(|g| std::cmp::Reverse(g.suite_name.len()))
}
