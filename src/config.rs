use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Args;
use crate::error::{ReleaseError, Result};
use crate::substitution::{substitute_mapping, EnvLookup};

pub const DEFAULT_CONFIG_FILE: &str = ".gitlab-ci-release.yml";
pub const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4/";
pub const DEFAULT_CHGLOG_COMMAND: &str = "git-chglog";
pub const DEFAULT_CHGLOG_CONFIG: &str = "/opt/chglog/config.yml";

/// Runtime settings, fixed once the process has parsed its arguments.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub project_id: String,
    pub api_key: String,
    pub config_file: PathBuf,
    pub chglog_command: String,
    pub chglog_config: PathBuf,
    pub working_directory: PathBuf,
    pub dry_run: bool,
    pub http_timeout: Option<Duration>,
    pub output_file: Option<PathBuf>,
}

impl Settings {
    pub fn from_args(args: Args) -> Result<Self> {
        let project_id = required_setting(args.project_id, "CI_PROJECT_ID")?;
        let api_key = required_setting(args.api_key, "GITLAB_API_KEY")?;

        Ok(Self {
            api_url: args.api_url,
            project_id,
            api_key,
            config_file: args.config_file,
            chglog_command: args.chglog_command,
            chglog_config: args.chglog_config,
            working_directory: args.working_directory,
            dry_run: args.dry_run,
            http_timeout: args.http_timeout.map(Duration::from_secs),
            output_file: args.output_file,
        })
    }
}

fn required_setting(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ReleaseError::Config(format!(
            "{} environment variable is required",
            name
        ))),
    }
}

/// A pre-built link attached to the release, independent of uploads.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AssetLink {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
}

/// The release described by `.gitlab-ci-release.yml`, after substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDescriptor {
    pub name: String,
    pub tag_name: String,
    /// Literal text, or the path of a file holding it
    pub description: String,
    pub assets_dir: Option<String>,
    pub changelog: Option<String>,
    pub git_ref: Option<String>,
    pub assets: Vec<AssetLink>,
}

impl ReleaseDescriptor {
    pub fn load<P: AsRef<Path>>(path: P, env: EnvLookup<'_>) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ReleaseError::Config(format!(
                "Release descriptor {:?} does not exist",
                path
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ReleaseError::Config(format!("Failed to read {:?}: {}", path, e)))?;

        Self::parse(&content, env)
    }

    pub fn parse(content: &str, env: EnvLookup<'_>) -> Result<Self> {
        let document: Value = serde_yaml::from_str(content)
            .map_err(|e| ReleaseError::Config(format!("Failed to parse YAML: {}", e)))?;

        let mut mapping = match document {
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(ReleaseError::Config(
                    "Release descriptor must be a YAML mapping".to_string(),
                ))
            }
        };

        for key in ["name", "tag_name", "description"] {
            if !mapping.contains_key(key) {
                return Err(ReleaseError::Config(format!(
                    "need {} for our release",
                    key
                )));
            }
        }

        substitute_mapping(&mut mapping, env);

        let assets = match mapping.get("assets") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_yaml::from_value(value.clone()).map_err(|e| {
                ReleaseError::Config(format!("Invalid assets list: {}", e))
            })?,
        };

        Ok(Self {
            name: required_field(&mapping, "name")?,
            tag_name: required_field(&mapping, "tag_name")?,
            description: required_field(&mapping, "description")?,
            assets_dir: optional_field(&mapping, "assets_dir")?,
            changelog: optional_field(&mapping, "changelog")?,
            git_ref: optional_field(&mapping, "ref")?,
            assets,
        })
    }
}

fn required_field(mapping: &Mapping, key: &str) -> Result<String> {
    optional_field(mapping, key)?
        .ok_or_else(|| ReleaseError::Config(format!("{} must not be empty", key)))
}

/// Reads a scalar as text; null, `false` and the empty string count as unset.
fn optional_field(mapping: &Mapping, key: &str) -> Result<Option<String>> {
    let text = match mapping.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(None),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(_) => {
            return Err(ReleaseError::Config(format!(
                "{} must be a string",
                key
            )))
        }
    };

    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}
