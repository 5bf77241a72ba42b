//! Reporting a completed test session

use anyhow::Result;
use clap::Args;
use iris_common::CompletedRun;
use iris_testrail::format::{plan_name, run_description};
use iris_testrail::plan::PostedRun;
use iris_testrail::{load_completed_run, report_test_results, PreparedPlan, TestRailConfig};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct ReportArgs {
    /// Completed-run JSON file written by the test driver
    #[arg(long)]
    pub results: PathBuf,

    /// Override the build id recorded in the results file
    #[arg(long)]
    pub build_id: Option<String>,

    /// Override the browser version recorded in the results file
    #[arg(long)]
    pub fx_version: Option<String>,

    /// Print the plan and results without contacting TestRail
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct PlanNameArgs {
    /// Browser version, e.g. 61.0.3
    #[arg(long)]
    pub fx_version: String,

    /// Build id, e.g. 20180704003137
    #[arg(long, default_value = "")]
    pub build_id: String,
}

impl TableDisplay for PostedRun {
    fn headers() -> Vec<&'static str> {
        vec!["Run ID", "Run", "Suite", "Passed", "Failed", "Blocked"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.run_id.to_string(),
            self.run_name.clone(),
            format!("{} ({})", self.suite_name, self.suite_id),
            self.passed.to_string(),
            self.failed.to_string(),
            self.blocked.to_string(),
        ]
    }
}

pub async fn execute(args: ReportArgs, config: &TestRailConfig, format: OutputFormat) -> Result<()> {
    let mut run = load_completed_run(&args.results)?;
    if let Some(build_id) = args.build_id {
        run.build.fx_build_id = build_id;
    }
    if let Some(fx_version) = args.fx_version {
        run.build.fx_version = fx_version;
    }

    if args.dry_run {
        let document = dry_run_document(config, &run)?;
        output::print_structured(&document, format);
        return Ok(());
    }

    let report = report_test_results(config, &run.build, &run.completed_tests).await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Test plan {} created", report.plan_name));
            output::print_list(&report.results.posted, format);
            let total: usize = report.results.posted.iter().map(PostedRun::total).sum();
            output::print_info(&format!(
                "{} result(s) posted to {} run(s)",
                total,
                report.results.posted.len()
            ));
            for skipped in &report.results.skipped_runs {
                output::print_warning(&format!("No suite matched test run {}", skipped));
            }
        }
        _ => output::print_structured(&report, format),
    }
    Ok(())
}

/// The `add_plan` body and the per-suite `add_results_for_cases` bodies a
/// report would send, built without contacting TestRail
pub fn dry_run_document(config: &TestRailConfig, run: &CompletedRun) -> Result<Value> {
    config.validate_suites()?;
    let plan = PreparedPlan::build(
        &config.project_name,
        &config.suite_dictionary,
        &run.build,
        &run.completed_tests,
    );
    info!(
        "Dry run: plan {} with {} suite(s)",
        plan.session.plan_name,
        plan.groups.len()
    );

    let mut results = Vec::with_capacity(plan.groups.len());
    for group in &plan.groups {
        results.push(json!({
            "suite": group.suite_name,
            "body": serde_json::to_value(group.results())?,
        }));
    }

    Ok(json!({
        "add_plan": serde_json::to_value(&plan.payload)?,
        "add_results_for_cases": results,
    }))
}

pub fn plan_name_command(args: PlanNameArgs) {
    println!("{}", plan_name(&args.fx_version));
    if !args.build_id.is_empty() {
        println!();
        println!("{}", run_description(&args.build_id, &args.fx_version));
    }
}
