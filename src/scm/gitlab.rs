use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT},
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{AssetLink, Settings};
use crate::error::{ReleaseError, Result};

/// Response of `POST /projects/:id/uploads`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UploadedAsset {
    pub alt: String,
    pub url: String,
    #[serde(default)]
    pub full_path: Option<String>,
    pub markdown: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CreateReleaseRequest {
    pub name: String,
    pub tag_name: String,
    pub description: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetLink>,
}

impl CreateReleaseRequest {
    /// Form fields in the bracket notation the API expects for nested values.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("name".to_string(), self.name.clone()),
            ("tag_name".to_string(), self.tag_name.clone()),
            ("description".to_string(), self.description.clone()),
        ];

        if let Some(git_ref) = &self.git_ref {
            fields.push(("ref".to_string(), git_ref.clone()));
        }

        for link in &self.assets {
            fields.push(("assets[links][][name]".to_string(), link.name.clone()));
            fields.push(("assets[links][][url]".to_string(), link.url.clone()));
            if let Some(link_type) = &link.link_type {
                fields.push(("assets[links][][link_type]".to_string(), link_type.clone()));
            }
            if let Some(filepath) = &link.filepath {
                fields.push(("assets[links][][filepath]".to_string(), filepath.clone()));
            }
        }

        fields
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default, rename = "_links")]
    pub links: ReleaseLinks,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReleaseLinks {
    #[serde(default, rename = "self")]
    pub self_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GitLabClient {
    client: Client,
    base_url: String,
    project: String,
}

impl GitLabClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", settings.api_key)).map_err(|e| {
                ReleaseError::Config(format!("Invalid GITLAB_API_KEY format: {}", e))
            })?,
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("gitlab-ci-release"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = settings.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            project: encode_project_id(&settings.project_id),
        })
    }

    pub fn uploads_url(&self) -> String {
        format!("{}/projects/{}/uploads", self.base_url, self.project)
    }

    pub fn releases_url(&self) -> String {
        format!("{}/projects/{}/releases", self.base_url, self.project)
    }

    pub async fn upload_file(&self, path: &Path) -> Result<UploadedAsset> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| ReleaseError::file_system(path, e))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let form = Form::new().part("file", Part::bytes(content).file_name(file_name));
        let url = self.uploads_url();
        debug!("POST {} ({})", url, path.display());

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReleaseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<UploadedAsset>().await?)
    }

    pub async fn upload_files(&self, files: &[impl AsRef<Path>]) -> Result<Vec<UploadedAsset>> {
        let mut uploads = Vec::with_capacity(files.len());
        for file in files {
            let upload = self.upload_file(file.as_ref()).await?;
            println!("📦 Uploaded {} as {}", file.as_ref().display(), upload.url);
            uploads.push(upload);
        }
        Ok(uploads)
    }

    /// Creates the release. Only `201 Created` counts as success.
    pub async fn create_release(&self, request: &CreateReleaseRequest) -> Result<Release> {
        let url = self.releases_url();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .form(&request.form_fields())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status != StatusCode::CREATED {
            return Err(ReleaseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}

/// Project paths such as `group/app` travel as a single URL segment.
fn encode_project_id(project_id: &str) -> String {
    project_id.trim().replace('/', "%2F")
}
