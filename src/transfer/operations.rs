//! Transfer operations
//!
//! Moves and copies entries between two sandboxed directories. The entry
//! keeps its name at the destination.

use log::{info, warn};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::StorageError;
use crate::storage::filesystem::{copy_file_with_metadata, copy_tree, entry_exists, is_real_dir, remove_entry};
use crate::storage::root::SandboxRoot;
use crate::storage::validation::{resolve_dir, resolve_entry, virtual_path};

struct TransferPaths {
    source: PathBuf,
    target: PathBuf,
    shown_source: String,
    shown_target: String,
}

fn prepare_transfer(
    root: &SandboxRoot,
    source_path: &str,
    source_name: &str,
    target_path: &str,
) -> Result<TransferPaths, StorageError> {
    let source = resolve_entry(root, source_path, source_name)?;
    let target_dir = resolve_dir(root, target_path)?;
    let target = resolve_entry(root, target_path, source_name)?;
    let shown_source = virtual_path(source_path, source_name);
    let shown_target = virtual_path(target_path, source_name);

    if !entry_exists(&source) {
        return Err(StorageError::NotFound(shown_source));
    }
    if entry_exists(&target) {
        return Err(StorageError::AlreadyExists(shown_target));
    }
    if !target_dir.is_dir() {
        return Err(StorageError::NotFound(target_path.to_string()));
    }
    // Compare real locations so a symlinked alias of the source is caught.
    if is_real_dir(&source)
        && fs::canonicalize(&target_dir)?.starts_with(fs::canonicalize(&source)?)
    {
        return Err(StorageError::InvalidPath(format!(
            "cannot place {shown_source} inside itself"
        )));
    }

    Ok(TransferPaths {
        source,
        target,
        shown_source,
        shown_target,
    })
}

/// Moves an entry into another directory.
///
/// A plain rename when possible; across devices the entry is copied and the
/// source removed afterwards.
pub fn move_entry(
    root: &SandboxRoot,
    source_path: &str,
    source_name: &str,
    target_path: &str,
) -> Result<(), StorageError> {
    let paths = prepare_transfer(root, source_path, source_name, target_path)?;

    match fs::rename(&paths.source, &paths.target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            warn!(
                "Rename of {} crosses devices, falling back to copy and delete",
                paths.shown_source
            );
            copy_any(&paths)?;
            remove_entry(&paths.source)?;
        }
        Err(e) => return Err(StorageError::Io(e)),
    }

    info!("Moved {} to {}", paths.shown_source, paths.shown_target);
    Ok(())
}

/// Copies an entry into another directory. Directories are copied deeply.
pub fn copy_entry(
    root: &SandboxRoot,
    source_path: &str,
    source_name: &str,
    target_path: &str,
) -> Result<(), StorageError> {
    let paths = prepare_transfer(root, source_path, source_name, target_path)?;
    let files = copy_any(&paths)?;

    info!(
        "Copied {} to {} ({} files)",
        paths.shown_source, paths.shown_target, files
    );
    Ok(())
}

fn copy_any(paths: &TransferPaths) -> Result<u64, StorageError> {
    if is_real_dir(&paths.source) {
        Ok(copy_tree(&paths.source, &paths.target)?)
    } else {
        copy_file_with_metadata(&paths.source, &paths.target)?;
        Ok(1)
    }
}
