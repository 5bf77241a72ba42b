//! CLI Commands

pub mod query;
pub mod report;

use anyhow::{bail, Context, Result};
use clap::Args;
use iris_common::SuiteMap;
use iris_testrail::{TestRail, TestRailConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings that override the configuration file
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// TestRail server URL
    #[arg(long, env = "IRIS_TESTRAIL_URL", global = true)]
    pub url: Option<String>,

    /// TestRail user
    #[arg(long, env = "IRIS_TESTRAIL_USERNAME", global = true)]
    pub username: Option<String>,

    /// TestRail password or API key
    #[arg(long, env = "IRIS_TESTRAIL_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// TestRail project name
    #[arg(long, env = "IRIS_TESTRAIL_PROJECT", global = true)]
    pub project: Option<String>,
}

/// Read the configuration file, then apply command-line and environment overrides.
///
/// A missing default file is tolerated so that queries can run from flags
/// alone; a file named explicitly must exist.
pub fn resolve_config(path: Option<&Path>, overrides: &ConnectionArgs) -> Result<TestRailConfig> {
    let mut config = match path {
        Some(path) => TestRailConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let default_path: PathBuf = iris_common::default_config_path();
            if default_path.exists() {
                TestRailConfig::load(&default_path)
                    .with_context(|| format!("loading {}", default_path.display()))?
            } else {
                debug!("No configuration at {}", default_path.display());
                TestRailConfig::new("", "", "", SuiteMap::default())
            }
        }
    };

    if let Some(url) = &overrides.url {
        config.url = url.clone();
    }
    if let Some(username) = &overrides.username {
        config.username = username.clone();
    }
    if let Some(password) = &overrides.password {
        config.password = password.clone();
    }
    if let Some(project) = &overrides.project {
        config.project_name = project.clone();
    }

    Ok(config)
}

/// Client for read-only queries, which do not need a suite map
pub fn connect(config: &TestRailConfig) -> Result<TestRail> {
    config.validate_connection()?;
    if config.password.is_empty() {
        bail!("TestRail password is not set (use --password or IRIS_TESTRAIL_PASSWORD)");
    }
    Ok(TestRail::with_client(
        config.client()?,
        config.project_name.clone(),
        config.suite_dictionary.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("testrail.toml");
        assert!(resolve_config(Some(&missing), &ConnectionArgs::default()).is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testrail.toml");
        std::fs::write(
            &path,
            "[test_rail]\nurl = \"https://a.example.com\"\nusername = \"a\"\npassword = \"a\"\nsuite_dictionary = \"{'Tabs': 5}\"\n",
        )
        .unwrap();

        let overrides = ConnectionArgs {
            url: Some("https://b.example.com".to_string()),
            password: Some("b".to_string()),
            project: Some("Firefox Nightly".to_string()),
            ..Default::default()
        };
        let config = resolve_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.url, "https://b.example.com");
        assert_eq!(config.username, "a");
        assert_eq!(config.password, "b");
        assert_eq!(config.project_name, "Firefox Nightly");
        assert_eq!(config.suite_dictionary.len(), 1);

        assert!(connect(&config).is_ok());
    }

    #[test]
    fn test_connect_requires_password() {
        let config = TestRailConfig::new("https://a.example.com", "a", "", SuiteMap::default());
        assert!(connect(&config).is_err());
    }
}
