use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ReleaseError, Result};
use crate::scm::gitlab::UploadedAsset;

pub const ASSETS_HEADING: &str = "# Assets";

/// Lists the files to upload for `path`.
///
/// A regular file yields itself; a directory yields every regular file below
/// it in walk order. Symlinks are followed, so a link to a file is uploaded
/// under the link's name and a dangling link is an error. The whole list is
/// resolved before anything is uploaded, so a bad path never leaves a partial
/// set of uploads behind.
pub fn resolve_upload_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        return Err(ReleaseError::not_found(path, "upload file or directory"));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|e| {
            let failed_path = e.path().unwrap_or(path).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            ReleaseError::file_system(failed_path, source)
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    debug!("Resolved {} upload(s) under {}", files.len(), path.display());
    Ok(files)
}

/// Appends the markdown link of every uploaded file below the description.
pub fn append_assets(description: &mut String, uploads: &[UploadedAsset]) {
    if uploads.is_empty() {
        return;
    }

    description.push_str("\n\n");
    description.push_str(ASSETS_HEADING);
    description.push('\n');
    for upload in uploads {
        description.push_str("- ");
        description.push_str(&upload.markdown);
        description.push('\n');
    }
}
