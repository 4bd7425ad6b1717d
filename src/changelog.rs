use log::debug;
use std::path::Path;
use tokio::process::Command;

use crate::error::{ReleaseError, Result};

pub const CHANGELOG_HEADING: &str = "# Changelog";

/// Runs the changelog generator for `range` and returns its trimmed output.
///
/// The generator is invoked as `<command> --config <config> <range...>`, with
/// `range` split on whitespace. Any failure is fatal for the release.
pub async fn generate_changelog(
    command: &str,
    config: &Path,
    range: &str,
    working_directory: &Path,
) -> Result<String> {
    debug!(
        "Running {} --config {} {}",
        command,
        config.display(),
        range
    );

    let output = Command::new(command)
        .arg("--config")
        .arg(config)
        .args(range.split_whitespace())
        .current_dir(working_directory)
        .output()
        .await
        .map_err(|e| ReleaseError::Subprocess(format!("Failed to run {}: {}", command, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReleaseError::Subprocess(format!(
            "{} exited with {}: {}",
            command,
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| ReleaseError::Subprocess(format!("{} printed invalid UTF-8: {}", command, e)))?;

    Ok(stdout.trim().to_string())
}

/// Appends a generated changelog below the description.
pub fn append_changelog(description: &mut String, changelog: &str) {
    description.push_str("\n\n");
    description.push_str(CHANGELOG_HEADING);
    description.push('\n');
    description.push_str(changelog);
}
