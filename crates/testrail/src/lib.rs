//! Iris TestRail Reporter
//!
//! Reports the outcome of an Iris UI test session to TestRail:
//! - Groups completed tests by the configured suite map
//! - Creates one plan per session with a run per suite
//! - Posts passed / failed / blocked status for every case
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TestRail (plan.rs)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  create_test_plan(build, tests) -> SyncReport               │
//! │    ├── group_by_suite(tests, suites) -> [SuiteGroup]        │
//! │    ├── plan_name(version), run_description(build, version)  │
//! │    ├── POST add_plan/{project_id}                           │
//! │    ├── parse_plan_runs(response) -> [RemoteRun]             │
//! │    └── POST add_results_for_cases/{run_id}   (per run)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ApiClient (client.rs)                                      │
//! │    ├── send_get(endpoint) -> JSON                           │
//! │    └── send_post(endpoint, payload) -> JSON                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod mapper;
pub mod models;
pub mod plan;
pub mod report;

pub use client::ApiClient;
pub use config::TestRailConfig;
pub use error::{ApiError, TestRailError, TestRailResult};
pub use mapper::{group_by_suite, SuiteGroup};
pub use plan::{PreparedPlan, SyncReport, TestRail};
pub use report::{load_completed_run, report_test_results};
