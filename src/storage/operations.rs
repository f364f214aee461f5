//! Storage operations
//!
//! Create, rename and delete for files and directories.

use log::info;
use std::fs;
use std::io::Write;

use crate::error::StorageError;
use crate::storage::filesystem::{WritePolicy, entry_exists, open_for_write, remove_entry};
use crate::storage::results::EntrySummary;
use crate::storage::root::SandboxRoot;
use crate::storage::validation::{resolve_entry, virtual_path};

/// Creates a directory, including missing intermediate directories.
pub fn create_directory(root: &SandboxRoot, path: &str, name: &str) -> Result<EntrySummary, StorageError> {
    let dir_path = resolve_entry(root, path, name)?;
    let shown = virtual_path(path, name);

    if entry_exists(&dir_path) {
        return Err(StorageError::AlreadyExists(shown));
    }

    fs::create_dir_all(&dir_path)?;
    info!("Created directory {} (real: {})", shown, dir_path.display());

    Ok(EntrySummary::directory(name))
}

/// Renames an entry within its directory.
pub fn rename_entry(
    root: &SandboxRoot,
    path: &str,
    old_name: &str,
    new_name: &str,
) -> Result<EntrySummary, StorageError> {
    let old_path = resolve_entry(root, path, old_name)?;
    let new_path = resolve_entry(root, path, new_name)?;

    if !entry_exists(&old_path) {
        return Err(StorageError::NotFound(virtual_path(path, old_name)));
    }
    if entry_exists(&new_path) {
        return Err(StorageError::AlreadyExists(virtual_path(path, new_name)));
    }

    fs::rename(&old_path, &new_path)?;

    let metadata = fs::metadata(&new_path).or_else(|_| fs::symlink_metadata(&new_path))?;
    let is_dir = metadata.is_dir();
    let size = if is_dir { 0 } else { metadata.len() };

    info!(
        "Renamed {} to {} (real: {})",
        virtual_path(path, old_name),
        new_name,
        new_path.display()
    );

    Ok(EntrySummary::with_stat(new_name, is_dir, size))
}

/// Deletes a file, or a directory recursively. There is no undo.
pub fn delete_entry(root: &SandboxRoot, path: &str, name: &str) -> Result<EntrySummary, StorageError> {
    let target = resolve_entry(root, path, name)?;
    let shown = virtual_path(path, name);

    if !entry_exists(&target) {
        return Err(StorageError::NotFound(shown));
    }

    remove_entry(&target)?;
    info!("Deleted {} (real: {})", shown, target.display());

    Ok(EntrySummary::named(name))
}

/// Creates a new file with initial content. Never overwrites.
pub fn create_file(
    root: &SandboxRoot,
    path: &str,
    name: &str,
    content: &str,
) -> Result<EntrySummary, StorageError> {
    let file_path = resolve_entry(root, path, name)?;
    let shown = virtual_path(path, name);

    if entry_exists(&file_path) {
        return Err(StorageError::AlreadyExists(shown));
    }

    let mut file = open_for_write(&file_path, WritePolicy::Strict, &shown)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    info!(
        "Created file {} ({} bytes, real: {})",
        shown,
        content.len(),
        file_path.display()
    );

    Ok(EntrySummary::file(name))
}
