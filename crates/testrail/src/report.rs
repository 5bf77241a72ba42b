//! Entry point used by the test-run driver once all tests completed

use iris_common::{BuildContext, CollectedTest, CompletedRun};
use std::path::Path;
use tracing::info;

use crate::config::TestRailConfig;
use crate::error::TestRailResult;
use crate::plan::{SyncReport, TestRail};

/// Report a finished test session to TestRail
pub async fn report_test_results(
    config: &TestRailConfig,
    build: &BuildContext,
    tests: &[CollectedTest],
) -> TestRailResult<SyncReport> {
    info!(
        "Starting Test Rail report: {} completed test(s) for Firefox {}",
        tests.len(),
        build.fx_version
    );
    let test_rail = TestRail::new(config)?;
    let report = test_rail.create_test_plan(build, tests).await?;

    info!(
        "Test Rail report finished: {} run(s) updated, {} skipped",
        report.results.posted.len(),
        report.results.skipped_runs.len()
    );
    Ok(report)
}

/// Read the completed-run file written by the test-run driver
pub fn load_completed_run(path: &Path) -> TestRailResult<CompletedRun> {
    Ok(CompletedRun::from_file(path)?)
}
