//! Read-only TestRail queries

use anyhow::Result;
use clap::Args;
use iris_testrail::models::{Project, RemoteTest, RunSummary};
use iris_testrail::TestRailConfig;

use super::connect;
use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct TestsArgs {
    /// Exact name of the test run
    #[arg(long)]
    pub run: String,
}

impl TableDisplay for Project {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Completed"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            if self.is_completed { "yes" } else { "no" }.to_string(),
        ]
    }
}

impl TableDisplay for RunSummary {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Name", "Suite", "Passed", "Failed", "Blocked", "Untested"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.suite_id.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            self.passed_count.to_string(),
            self.failed_count.to_string(),
            self.blocked_count.to_string(),
            self.untested_count.to_string(),
        ]
    }
}

impl TableDisplay for RemoteTest {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Case", "Title", "Status"]
    }

    fn row(&self) -> Vec<String> {
        let status = match self.status_id.and_then(iris_common::ResultStatus::from_id) {
            Some(status) => status.to_string(),
            None => self
                .status_id
                .map(|id| format!("status {}", id))
                .unwrap_or_else(|| "-".to_string()),
        };
        vec![
            self.id.to_string(),
            format!("C{}", self.case_id),
            self.title.clone(),
            status,
        ]
    }
}

pub async fn projects(config: &TestRailConfig, format: OutputFormat) -> Result<()> {
    let test_rail = connect(config)?;
    let projects = test_rail.get_all_projects().await?;
    output::print_list(&projects, format);
    Ok(())
}

pub async fn runs(config: &TestRailConfig, format: OutputFormat) -> Result<()> {
    let test_rail = connect(config)?;
    let runs = test_rail.get_all_runs(test_rail.project_name()).await?;
    output::print_list(&runs, format);
    Ok(())
}

pub async fn tests(args: TestsArgs, config: &TestRailConfig, format: OutputFormat) -> Result<()> {
    let test_rail = connect(config)?;
    let tests = test_rail
        .get_tests_from_run(test_rail.project_name(), &args.run)
        .await?;
    output::print_list(&tests, format);
    Ok(())
}
