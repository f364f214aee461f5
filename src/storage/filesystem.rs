//! File system helpers
//!
//! Low-level filesystem calls shared by the storage and transfer operations.

use log::warn;
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::StorageError;

/// What to do when a write targets an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Refuse with `AlreadyExists`.
    Strict,
    /// Replace the existing file.
    Overwrite,
}

/// True when anything, including a dangling symlink, occupies `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// True for real directories; symlinks are not followed.
pub fn is_real_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false)
}

/// Opens `path` for writing under the given policy.
///
/// `Strict` uses create-new so the existence check and the creation are one
/// filesystem call.
pub fn open_for_write(path: &Path, policy: WritePolicy, shown: &str) -> Result<File, StorageError> {
    let mut options = OpenOptions::new();
    options.write(true);
    match policy {
        WritePolicy::Strict => options.create_new(true),
        WritePolicy::Overwrite => options.create(true).truncate(true),
    };

    options.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(shown.to_string()),
        io::ErrorKind::NotFound => StorageError::NotFound(shown.to_string()),
        io::ErrorKind::IsADirectory => StorageError::IsADirectory(shown.to_string()),
        _ => StorageError::Io(e),
    })
}

/// Removes a file, a symlink or a whole directory tree.
pub fn remove_entry(path: &Path) -> io::Result<()> {
    if is_real_dir(path) {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Copies a single file, keeping permissions and access/modification times.
pub fn copy_file_with_metadata(source: &Path, target: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, target)?;

    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    OpenOptions::new().write(true).open(target)?.set_times(times)?;

    Ok(bytes)
}

/// Deep-copies a directory tree. Symlinks inside the tree are skipped.
///
/// Not transactional: a failure part way leaves a partially populated target.
pub fn copy_tree(source: &Path, target: &Path) -> io::Result<u64> {
    let mut copied = 0u64;

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(io::Error::other)?;
        let destination = target.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&destination)?;
        } else if file_type.is_file() {
            copy_file_with_metadata(entry.path(), &destination)?;
            copied += 1;
        } else {
            warn!("Skipping symlink while copying tree: {}", entry.path().display());
        }
    }

    Ok(copied)
}
