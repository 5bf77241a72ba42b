//! TestRail reporter configuration

use iris_common::SuiteMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::client::{ApiClient, DEFAULT_API_PATH};
use crate::error::{TestRailError, TestRailResult};

/// Connection settings and suite mapping, read once per session
#[derive(Clone, Serialize, Deserialize)]
pub struct TestRailConfig {
    /// TestRail server URL
    #[serde(default, alias = "test_rail_url")]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing)]
    pub password: String,

    /// Project the plans are created in
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// API entry point relative to `url`
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Suite name to suite id mapping
    #[serde(default)]
    pub suite_dictionary: SuiteMap,
}

fn default_project_name() -> String {
    "Firefox Desktop".to_string()
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

impl std::fmt::Debug for TestRailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRailConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project_name", &self.project_name)
            .field("api_path", &self.api_path)
            .field("suite_dictionary", &self.suite_dictionary)
            .finish()
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(alias = "Test_rail")]
    test_rail: TestRailConfig,
}

impl TestRailConfig {
    pub fn new(url: &str, username: &str, password: &str, suites: SuiteMap) -> Self {
        Self {
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            project_name: default_project_name(),
            api_path: default_api_path(),
            suite_dictionary: suites,
        }
    }

    /// Parse the `[test_rail]` section of a TOML document
    pub fn from_toml(content: &str) -> TestRailResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.test_rail)
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> TestRailResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TestRailError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Check the settings needed to talk to the server
    pub fn validate_connection(&self) -> TestRailResult<()> {
        if self.url.trim().is_empty() {
            return Err(TestRailError::InvalidConfig("TestRail url is not set".into()));
        }
        if self.username.trim().is_empty() {
            return Err(TestRailError::InvalidConfig(
                "TestRail username is not set".into(),
            ));
        }
        Ok(())
    }

    /// Check the settings needed to report a test session
    pub fn validate(&self) -> TestRailResult<()> {
        self.validate_connection()?;
        self.validate_suites()
    }

    pub fn validate_suites(&self) -> TestRailResult<()> {
        if self.suite_dictionary.is_empty() {
            return Err(TestRailError::InvalidConfig(
                "suite_dictionary has no suites".into(),
            ));
        }
        if let Some((name, id)) = self
            .suite_dictionary
            .iter()
            .find(|(name, _)| name.trim().is_empty())
        {
            return Err(TestRailError::InvalidConfig(format!(
                "suite {} has an empty name {:?}",
                id, name
            )));
        }
        Ok(())
    }

    /// Build the API client these settings describe
    pub fn client(&self) -> TestRailResult<ApiClient> {
        ApiClient::with_api_path(&self.url, &self.api_path, &self.username, &self.password)
            .map_err(|e| TestRailError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_common::SuiteId;

    #[test]
    fn test_parse_literal_suite_dictionary() {
        let config = TestRailConfig::from_toml(
            r#"
[test_rail]
url = "https://testrail.example.com"
username = "iris@example.com"
password = "secret"
suite_dictionary = "{'Bookmarks': 10, 'History': 20}"
"#,
        )
        .unwrap();

        assert_eq!(config.project_name, "Firefox Desktop");
        assert_eq!(config.api_path, "index.php?/api/v2/");
        assert_eq!(config.suite_dictionary.get("History"), Some(SuiteId(20)));
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_table_suite_dictionary() {
        let config = TestRailConfig::from_toml(
            r#"
[test_rail]
url = "https://testrail.example.com"
username = "iris@example.com"
project_name = "Firefox Nightly"

[test_rail.suite_dictionary]
Zoom = 3
"Awesome Bar" = "1"
Downloads = 2
"#,
        )
        .unwrap();

        let names: Vec<_> = config.suite_dictionary.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zoom", "Awesome Bar", "Downloads"]);
        assert_eq!(config.project_name, "Firefox Nightly");
        assert!(config.password.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testrail.toml");
        std::fs::write(
            &path,
            "[Test_rail]\ntest_rail_url = \"https://tr.example.com\"\nusername = \"u\"\nsuite_dictionary = \"{'Tabs': 5}\"\n",
        )
        .unwrap();

        let config = TestRailConfig::load(&path).unwrap();
        assert_eq!(config.url, "https://tr.example.com");
        assert_eq!(config.suite_dictionary.len(), 1);

        let missing = TestRailConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(TestRailError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_incomplete_config() {
        let suites = SuiteMap::parse_literal("{'Bookmarks': 10}").unwrap();

        let config = TestRailConfig::new("", "u", "p", suites.clone());
        assert!(config.validate().is_err());

        let config = TestRailConfig::new("https://tr.example.com", "", "p", suites.clone());
        assert!(config.validate().is_err());

        let config = TestRailConfig::new("https://tr.example.com", "u", "p", SuiteMap::default());
        assert!(config.validate().is_err());
        assert!(config.validate_connection().is_ok());

        let blank = SuiteMap::parse_literal("{' ': 10}").unwrap();
        let config = TestRailConfig::new("https://tr.example.com", "u", "p", blank);
        assert!(config.validate().is_err());

        let config = TestRailConfig::new("https://tr.example.com", "u", "p", suites);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = TestRailConfig::new("https://tr.example.com", "u", "hunter2", SuiteMap::default());
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
