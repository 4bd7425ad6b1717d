//! Error types for the release pipeline.
//!
//! Every failure aborts the run; `main` maps any of these to exit status 1.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReleaseError>;

#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Missing descriptor, unparsable YAML, missing required keys or settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file or directory needed for the description or uploads is unusable
    #[error("File system error for {path:?}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The changelog generator could not be run or exited non-zero
    #[error("Changelog command failed: {0}")]
    Subprocess(String),

    /// Transport-level failure talking to the API
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with an unexpected status
    #[error("GitLab API returned status {status}")]
    Api { status: u16, body: String },
}

impl ReleaseError {
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(path: impl Into<PathBuf>, what: &str) -> Self {
        let path = path.into();
        let source = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", what),
        );
        Self::FileSystem { path, source }
    }

    /// Response body to show the user, if the API produced one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_exposes_body() {
        let error = ReleaseError::Api {
            status: 400,
            body: "{\"message\":\"tag_name is missing\"}".to_string(),
        };
        assert_eq!(
            error.response_body(),
            Some("{\"message\":\"tag_name is missing\"}")
        );
        assert_eq!(error.to_string(), "GitLab API returned status 400");
    }

    #[test]
    fn test_not_found_mentions_path() {
        let error = ReleaseError::not_found("dist/app.tar.gz", "upload path");
        let message = error.to_string();
        assert!(message.contains("dist/app.tar.gz"));
        assert!(message.contains("upload path does not exist"));
        assert!(error.response_body().is_none());
    }
}
