//! File preview classification

use log::info;
use std::fs;
use std::path::Path;

use crate::error::StorageError;
use crate::storage::content::read_file;
use crate::storage::root::SandboxRoot;
use crate::storage::validation::{resolve_entry, virtual_path};
use crate::transfer::results::{Preview, PreviewKind};

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "py", "js", "html", "css", "json", "xml", "yaml", "yml",
];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];
const PDF_EXTENSION: &str = "pdf";

/// Classifies a filename by extension, case-insensitively.
pub fn classify_preview(filename: &str) -> Result<PreviewKind, StorageError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Ok(PreviewKind::Text)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(PreviewKind::Image)
    } else if ext == PDF_EXTENSION {
        Ok(PreviewKind::Pdf)
    } else {
        Err(StorageError::UnsupportedPreviewType(filename.to_string()))
    }
}

/// Builds a preview: text content for text files, only the kind otherwise.
pub fn preview(root: &SandboxRoot, path: &str, filename: &str) -> Result<Preview, StorageError> {
    let kind = classify_preview(filename)?;

    let content = match kind {
        PreviewKind::Text => Some(read_file(root, path, filename)?),
        PreviewKind::Image | PreviewKind::Pdf => {
            let file_path = resolve_entry(root, path, filename)?;
            let shown = virtual_path(path, filename);
            match fs::metadata(&file_path) {
                Ok(m) if m.is_dir() => return Err(StorageError::IsADirectory(shown)),
                Ok(_) => None,
                Err(_) => return Err(StorageError::NotFound(shown)),
            }
        }
    };

    info!("Preview of {} as {:?}", virtual_path(path, filename), kind);
    Ok(Preview { kind, content })
}
