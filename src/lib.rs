pub mod assets;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod release;
pub mod scm;
pub mod substitution;

use clap::Parser;
use log::info;
use std::path::PathBuf;

use crate::assets::resolve_upload_files;
use crate::changelog::generate_changelog;
use crate::cli::Args;
use crate::config::{ReleaseDescriptor, Settings};
use crate::error::Result;
use crate::output::ReleaseOutcome;
use crate::release::{build_request, compose_description, resolve_description};
use crate::scm::gitlab::GitLabClient;
use crate::substitution::process_env;

type EnvSource = Box<dyn Fn(&str) -> Option<String>>;

pub struct ReleaseApplication {
    settings: Settings,
    client: GitLabClient,
    env: EnvSource,
}

impl ReleaseApplication {
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_env(settings, process_env)
    }

    /// Uses `env` instead of the process environment for CI variable tokens.
    pub fn with_env(
        settings: Settings,
        env: impl Fn(&str) -> Option<String> + 'static,
    ) -> Result<Self> {
        let client = GitLabClient::new(&settings)?;
        Ok(Self {
            settings,
            client,
            env: Box::new(env),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Where the dotenv report goes, relative to the working directory.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.settings
            .output_file
            .as_ref()
            .map(|file| self.settings.working_directory.join(file))
    }

    pub async fn run(&self) -> Result<ReleaseOutcome> {
        let working_directory = &self.settings.working_directory;
        let config_path = working_directory.join(&self.settings.config_file);

        let descriptor = ReleaseDescriptor::load(&config_path, &*self.env)?;
        println!("🔧 Loaded release descriptor from {:?}", config_path);
        info!(
            "Release {:?} for tag {:?} in project {}",
            descriptor.name, descriptor.tag_name, self.settings.project_id
        );

        let base_description = resolve_description(&descriptor.description, working_directory)?;

        let changelog = match &descriptor.changelog {
            Some(range) => {
                let text = generate_changelog(
                    &self.settings.chglog_command,
                    &self.settings.chglog_config,
                    range,
                    working_directory,
                )
                .await?;
                println!("📝 Generated changelog for {}", range);
                Some(text)
            }
            None => None,
        };

        let files = match &descriptor.assets_dir {
            Some(assets_dir) => resolve_upload_files(&working_directory.join(assets_dir))?,
            None => Vec::new(),
        };

        if self.settings.dry_run {
            return Ok(self.dry_run(&descriptor, base_description, changelog, files.len()));
        }

        let uploads = self.client.upload_files(&files).await?;

        let description = compose_description(base_description, changelog.as_deref(), &uploads);
        let request = build_request(&descriptor, description);

        println!("🚀 Creating release {} ({})", request.name, request.tag_name);
        let release = self.client.create_release(&request).await?;
        println!("✅ Made release {}", request.tag_name);

        Ok(ReleaseOutcome {
            released: true,
            name: release.name.unwrap_or(request.name),
            tag_name: release.tag_name.unwrap_or(request.tag_name),
            uploaded_assets: uploads.len(),
            release_url: release.links.self_url,
        })
    }

    fn dry_run(
        &self,
        descriptor: &ReleaseDescriptor,
        base_description: String,
        changelog: Option<String>,
        file_count: usize,
    ) -> ReleaseOutcome {
        let description = compose_description(base_description, changelog.as_deref(), &[]);
        let request = build_request(descriptor, description);

        println!("🔍 Dry run mode - skipping {} upload(s) and the release request", file_count);
        if let Ok(json) = serde_json::to_string_pretty(&request) {
            println!("{}", json);
        }

        ReleaseOutcome {
            released: false,
            name: request.name,
            tag_name: request.tag_name,
            uploaded_assets: 0,
            release_url: None,
        }
    }
}

// Factory function for easier testing and dependency injection
pub fn create_release_application() -> Result<ReleaseApplication> {
    let args = Args::parse();
    let settings = Settings::from_args(args)?;
    ReleaseApplication::new(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_API_URL, DEFAULT_CHGLOG_COMMAND, DEFAULT_CHGLOG_CONFIG};
    use crate::error::ReleaseError;
    use std::path::Path;
    use tempfile::TempDir;

    fn create_test_settings(working_directory: &Path) -> Settings {
        Settings {
            // Nothing listens here; tests below never reach the network
            api_url: "http://127.0.0.1:9/api/v4".to_string(),
            project_id: "42".to_string(),
            api_key: "token".to_string(),
            config_file: PathBuf::from(".gitlab-ci-release.yml"),
            chglog_command: DEFAULT_CHGLOG_COMMAND.to_string(),
            chglog_config: PathBuf::from(DEFAULT_CHGLOG_CONFIG),
            working_directory: working_directory.to_path_buf(),
            dry_run: true,
            http_timeout: None,
            output_file: None,
        }
    }

    #[test]
    fn test_release_application_creation() {
        let mut settings = create_test_settings(Path::new("."));
        settings.api_url = DEFAULT_API_URL.to_string();
        let app = ReleaseApplication::new(settings).unwrap();

        assert!(app.settings().dry_run);
        assert_eq!(app.settings().project_id, "42");
    }

    #[test]
    fn test_output_path_follows_working_directory() {
        let mut settings = create_test_settings(Path::new("/builds/app"));
        settings.output_file = Some(PathBuf::from("release.env"));
        let app = ReleaseApplication::new(settings).unwrap();
        assert_eq!(
            app.output_path(),
            Some(PathBuf::from("/builds/app/release.env"))
        );

        let mut settings = create_test_settings(Path::new("/builds/app"));
        settings.output_file = Some(PathBuf::from("/tmp/release.env"));
        let app = ReleaseApplication::new(settings).unwrap();
        assert_eq!(app.output_path(), Some(PathBuf::from("/tmp/release.env")));

        let app = ReleaseApplication::new(create_test_settings(Path::new("."))).unwrap();
        assert_eq!(app.output_path(), None);
    }

    #[tokio::test]
    async fn test_dry_run_resolves_without_network() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(
            temp_dir.path().join(".gitlab-ci-release.yml"),
            "name: $CI_PROJECT_NAME\ntag_name: v1.0\ndescription: notes\nassets_dir: dist\n",
        )
        .unwrap();
        std::fs::create_dir(temp_dir.path().join("dist")).unwrap();
        std::fs::write(temp_dir.path().join("dist").join("app.zip"), "zip").unwrap();

        let app = ReleaseApplication::with_env(create_test_settings(temp_dir.path()), |name| {
            (name == "CI_PROJECT_NAME").then(|| "widget".to_string())
        })
        .unwrap();
        let outcome = app.run().await.unwrap();

        assert!(!outcome.released);
        assert_eq!(outcome.name, "widget");
        assert_eq!(outcome.tag_name, "v1.0");
    }

    #[tokio::test]
    async fn test_missing_descriptor_fails_before_network() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut settings = create_test_settings(temp_dir.path());
        settings.dry_run = false;

        let app = ReleaseApplication::new(settings).unwrap();
        let result = app.run().await;

        assert!(matches!(result, Err(ReleaseError::Config(_))));
    }
}
