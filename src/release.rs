use std::path::Path;

use crate::assets::append_assets;
use crate::changelog::append_changelog;
use crate::config::ReleaseDescriptor;
use crate::error::{ReleaseError, Result};
use crate::scm::gitlab::{CreateReleaseRequest, UploadedAsset};

/// Returns the description text, reading it from disk when it names a file.
///
/// Relative paths are taken from `base`. Anything that is not an existing
/// regular file is used as literal text.
pub fn resolve_description(description: &str, base: &Path) -> Result<String> {
    let candidate = base.join(description);
    if !candidate.is_file() {
        return Ok(description.to_string());
    }

    println!("📝 Reading description from {}", candidate.display());
    std::fs::read_to_string(&candidate).map_err(|e| ReleaseError::file_system(candidate, e))
}

/// Builds the final description: base text, then changelog, then assets.
pub fn compose_description(
    base: String,
    changelog: Option<&str>,
    uploads: &[UploadedAsset],
) -> String {
    let mut description = base;
    if let Some(changelog) = changelog {
        append_changelog(&mut description, changelog);
    }
    append_assets(&mut description, uploads);
    description
}

pub fn build_request(descriptor: &ReleaseDescriptor, description: String) -> CreateReleaseRequest {
    CreateReleaseRequest {
        name: descriptor.name.clone(),
        tag_name: descriptor.tag_name.clone(),
        description,
        git_ref: descriptor.git_ref.clone(),
        assets: descriptor.assets.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetLink;
    use tempfile::TempDir;

    fn create_test_descriptor() -> ReleaseDescriptor {
        ReleaseDescriptor {
            name: "v1".to_string(),
            tag_name: "v1.0".to_string(),
            description: "Release notes".to_string(),
            assets_dir: None,
            changelog: None,
            git_ref: None,
            assets: Vec::new(),
        }
    }

    #[test]
    fn test_literal_description() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let description = resolve_description("Release notes", temp_dir.path()).unwrap();
        assert_eq!(description, "Release notes");
    }

    #[test]
    fn test_description_from_file_is_verbatim() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(temp_dir.path().join("NOTES.md"), "## Highlights\n\n* faster\n").unwrap();

        let description = resolve_description("NOTES.md", temp_dir.path()).unwrap();
        assert_eq!(description, "## Highlights\n\n* faster\n");
    }

    #[test]
    fn test_directory_named_description_is_literal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::create_dir(temp_dir.path().join("docs")).unwrap();

        let description = resolve_description("docs", temp_dir.path()).unwrap();
        assert_eq!(description, "docs");
    }

    #[test]
    fn test_compose_with_changelog_and_assets() {
        let uploads = vec![UploadedAsset {
            alt: "app.zip".to_string(),
            url: "/uploads/abc/app.zip".to_string(),
            full_path: None,
            markdown: "[app.zip](/uploads/abc/app.zip)".to_string(),
        }];

        let description = compose_description(
            "Release notes".to_string(),
            Some("- fix bug"),
            &uploads,
        );

        assert_eq!(
            description,
            "Release notes\n\n# Changelog\n- fix bug\n\n# Assets\n- [app.zip](/uploads/abc/app.zip)\n"
        );
    }

    #[test]
    fn test_compose_plain() {
        let description = compose_description("Release notes".to_string(), None, &[]);
        assert_eq!(description, "Release notes");
    }

    #[test]
    fn test_build_request_carries_ref_and_links() {
        let mut descriptor = create_test_descriptor();
        descriptor.git_ref = Some("main".to_string());
        descriptor.assets = vec![AssetLink {
            name: "Image".to_string(),
            url: "https://registry.example.com/app".to_string(),
            link_type: Some("image".to_string()),
            filepath: None,
        }];

        let request = build_request(&descriptor, "text".to_string());
        assert_eq!(request.name, "v1");
        assert_eq!(request.tag_name, "v1.0");
        assert_eq!(request.description, "text");
        assert_eq!(request.git_ref.as_deref(), Some("main"));
        assert_eq!(request.assets.len(), 1);
    }
}
