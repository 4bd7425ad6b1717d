use log::warn;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReleaseOutcome {
    pub released: bool,
    pub name: String,
    pub tag_name: String,
    pub uploaded_assets: usize,
    pub release_url: Option<String>,
}

/// Prints the outcome and writes the dotenv report when one is configured.
///
/// Runs after the release exists, so a report that cannot be written is only
/// a warning and never changes the outcome.
pub fn output_results(outcome: &ReleaseOutcome, output_file: Option<&Path>) {
    if let Some(output_file) = output_file {
        if let Err(e) = std::fs::write(output_file, dotenv_report(outcome)) {
            warn!(
                "Failed to write release report {}: {}",
                output_file.display(),
                e
            );
        }
    }

    if let Ok(json) = serde_json::to_string_pretty(outcome) {
        println!("📊 Result: {}", json);
    }
}

/// `KEY=value` lines for a GitLab `artifacts:reports:dotenv` file.
pub fn dotenv_report(outcome: &ReleaseOutcome) -> String {
    format!(
        "RELEASE_CREATED={}\nRELEASE_NAME={}\nRELEASE_TAG={}\nRELEASE_URL={}\nRELEASE_UPLOADED_ASSETS={}\n",
        outcome.released,
        single_line(&outcome.name),
        single_line(&outcome.tag_name),
        outcome.release_url.as_deref().unwrap_or(""),
        outcome.uploaded_assets
    )
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
