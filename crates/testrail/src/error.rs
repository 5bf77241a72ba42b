//! Error types for TestRail reporting

use thiserror::Error;

/// Failure of a single call to the TestRail API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("TestRail API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("TestRail API returned a body that is not JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid API URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum TestRailError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Test run not found: {run} in project {project}")]
    RunNotFound { project: String, run: String },

    #[error("Invalid API response format from {operation}: {reason}")]
    InvalidResponseShape { operation: String, reason: String },

    #[error("{operation} failed: {source}")]
    RemoteCallFailed {
        operation: String,
        #[source]
        source: ApiError,
    },

    #[error("Invalid run_id for test run {0}")]
    InvalidRunId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Common(#[from] iris_common::Error),
}

impl TestRailError {
    pub(crate) fn remote(operation: impl Into<String>, source: ApiError) -> Self {
        TestRailError::RemoteCallFailed {
            operation: operation.into(),
            source,
        }
    }

    pub(crate) fn shape(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        TestRailError::InvalidResponseShape {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

pub type TestRailResult<T> = Result<T, TestRailError>;
