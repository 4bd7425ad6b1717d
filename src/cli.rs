use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    DEFAULT_API_URL, DEFAULT_CHGLOG_COMMAND, DEFAULT_CHGLOG_CONFIG, DEFAULT_CONFIG_FILE,
};

/// Create a GitLab release from a YAML descriptor.
///
/// Every option can also be provided through the environment, which is how
/// it is normally driven from a `.gitlab-ci.yml` job.
#[derive(Debug, Clone, Parser)]
#[command(name = "gitlab-ci-release", version, about)]
pub struct Args {
    /// Path to the release descriptor
    #[arg(long, env = "RELEASE_CONFIG_FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Base URL of the GitLab API
    #[arg(long, env = "GITLAB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Project the release is created in (numeric id or `group/project`)
    #[arg(long, env = "CI_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Token sent as bearer credentials on every API call
    #[arg(long, env = "GITLAB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Changelog generator executable
    #[arg(long, env = "GITCHGLOG_COMMAND", default_value = DEFAULT_CHGLOG_COMMAND)]
    pub chglog_command: String,

    /// Configuration file handed to the changelog generator
    #[arg(long, env = "GITCHGLOG_CONFIG", default_value = DEFAULT_CHGLOG_CONFIG)]
    pub chglog_config: PathBuf,

    /// Directory the release is prepared from
    #[arg(long, env = "WORKING_DIRECTORY", default_value = ".")]
    pub working_directory: PathBuf,

    /// Resolve everything but skip uploads and the release request
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Per-request HTTP timeout in seconds (no timeout when unset)
    #[arg(long, env = "HTTP_TIMEOUT")]
    pub http_timeout: Option<u64>,

    /// Write a dotenv report of the created release to this file
    #[arg(long, env = "RELEASE_OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "gitlab-ci-release",
            "--config-file",
            "release.yml",
            "--api-url",
            "https://gitlab.example.com/api/v4",
            "--project-id",
            "42",
            "--api-key",
            "secret",
            "--dry-run",
            "--http-timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(args.config_file, PathBuf::from("release.yml"));
        assert_eq!(args.api_url, "https://gitlab.example.com/api/v4");
        assert_eq!(args.project_id.as_deref(), Some("42"));
        assert_eq!(args.api_key.as_deref(), Some("secret"));
        assert!(args.dry_run);
        assert_eq!(args.http_timeout, Some(30));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let result = Args::try_parse_from(["gitlab-ci-release", "--no-such-flag"]);
        assert!(result.is_err());
    }
}
