//! Plan names and descriptions derived from build metadata

use chrono::{Local, NaiveDate};

/// Name of the plan created for a test session, dated today
pub fn plan_name(fx_version: &str) -> String {
    plan_name_for(fx_version, &os_label(), Local::now().date_naive())
}

pub fn plan_name_for(fx_version: &str, os: &str, date: NaiveDate) -> String {
    format!(
        "[Firefox {}][{}] Iris Test Run {}",
        fx_version,
        capitalize(os),
        date.format("%Y-%m-%d")
    )
}

/// Markdown description attached to the plan
pub fn run_description(fx_build_id: &str, fx_version: &str) -> String {
    format!(
        "**BUILD INFORMATION**\n*Firefox Build ID*:{}\n*Firefox Version:*{}",
        fx_build_id, fx_version
    )
}

/// Short name of the platform the tests ran on
pub fn os_label() -> String {
    os_label_for(std::env::consts::OS)
}

/// Iris platform label for a Rust target OS name
pub fn os_label_for(target_os: &str) -> String {
    match target_os {
        "windows" => "win".to_string(),
        "macos" => "osx".to_string(),
        other => other.to_string(),
    }
}

/// First character upper-cased, the rest lower-cased
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
