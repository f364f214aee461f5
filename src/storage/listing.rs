//! Directory listing

use chrono::{DateTime, Local};
use log::{info, warn};
use std::fs;
use std::time::SystemTime;

use crate::error::StorageError;
use crate::storage::mime::guess_mimetype;
use crate::storage::results::DirectoryEntry;
use crate::storage::root::SandboxRoot;
use crate::storage::validation::resolve_dir;

/// Lists the immediate children of a directory.
///
/// Directories come first, then entries by case-insensitive name. The
/// listing is built eagerly.
pub fn list_directory(root: &SandboxRoot, path: &str) -> Result<Vec<DirectoryEntry>, StorageError> {
    let real_path = resolve_dir(root, path)?;

    if !real_path.exists() {
        if path.trim_matches('/').is_empty() {
            fs::create_dir_all(&real_path)?;
        } else {
            return Err(StorageError::NotFound(path.to_string()));
        }
    }
    if !real_path.is_dir() {
        return Err(StorageError::NotADirectory(path.to_string()));
    }

    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(&real_path)? {
        let dir_entry = dir_entry?;
        let name = dir_entry.file_name().to_string_lossy().to_string();

        let metadata = match fs::metadata(dir_entry.path()) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Cannot stat {} ({}), using link metadata", name, e);
                dir_entry.metadata()?
            }
        };

        let is_dir = metadata.is_dir();
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        entries.push(DirectoryEntry {
            mimetype: if is_dir { None } else { guess_mimetype(&name) },
            size: if is_dir { 0 } else { metadata.len() },
            modified_at: DateTime::<Local>::from(modified),
            is_dir,
            name,
        });
    }

    entries.sort_by_cached_key(|e| (!e.is_dir, e.name.to_lowercase()));

    info!(
        "Listed directory '{}' (real: {}) - {} entries",
        path,
        real_path.display(),
        entries.len()
    );

    Ok(entries)
}
