//! Iris Common Library
//!
//! Shared types for reporting Iris UI test results: collected test records,
//! TestRail identifiers, result statuses and the configured suite map.

pub mod error;
pub mod suite_map;
pub mod types;

pub use error::{Error, Result};
pub use suite_map::SuiteMap;
pub use types::*;

/// Iris reporter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default store path
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".iris")
}

/// Default TestRail configuration file
pub fn default_config_path() -> std::path::PathBuf {
    default_store_path().join("testrail.toml")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
