//! Path validation
//!
//! Normalizes caller-supplied relative paths and keeps every resolved
//! physical path inside the sandbox root.

use path_clean::PathClean;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;
use crate::storage::root::SandboxRoot;

/// Checks a relative path for traversal. The empty path is the root.
///
/// Surrounding `/` are ignored. After collapsing `.` and `..` the path must
/// consist of plain segments only: no parent segment, no root and no drive
/// prefix. Never touches the filesystem.
pub fn validate_path(path: &str) -> bool {
    if path.contains('\0') {
        return false;
    }

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return true;
    }

    Path::new(trimmed)
        .clean()
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Checks that an entry name is exactly one path segment.
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c| matches!(c, '/' | '\\' | '\0'))
}

/// Normalized relative form of a path that already passed [`validate_path`].
pub fn normalize_path(path: &str) -> PathBuf {
    let cleaned = Path::new(path.trim_matches('/')).clean();
    if cleaned == Path::new(".") {
        PathBuf::new()
    } else {
        cleaned
    }
}

/// Caller-facing path of `name` inside `path`, used in messages and logs.
pub fn virtual_path(path: &str, name: &str) -> String {
    let dir = path.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Resolves a relative directory path to its physical location.
pub fn resolve_dir(root: &SandboxRoot, path: &str) -> Result<PathBuf, StorageError> {
    if !validate_path(path) {
        return Err(StorageError::InvalidPath(path.to_string()));
    }

    let base = root.ensure_exists()?;
    let target = base.join(normalize_path(path));
    ensure_contained(base, &target, path)?;

    Ok(target)
}

/// Resolves `name` inside the relative directory `path`.
pub fn resolve_entry(root: &SandboxRoot, path: &str, name: &str) -> Result<PathBuf, StorageError> {
    if !validate_name(name) {
        return Err(StorageError::InvalidPath(virtual_path(path, name)));
    }

    let dir = resolve_dir(root, path)?;
    let target = dir.join(name);
    ensure_contained(root.resolve()?, &target, &virtual_path(path, name))?;

    Ok(target)
}

// The deepest existing ancestor of `target` decides containment, with
// symlinks resolved. Dangling links are checked against their literal target.
fn ensure_contained(base: &Path, target: &Path, shown: &str) -> Result<(), StorageError> {
    for ancestor in target.ancestors() {
        match ancestor.canonicalize() {
            Ok(canonical) if canonical.starts_with(base) => return Ok(()),
            Ok(_) => return Err(StorageError::InvalidPath(shown.to_string())),
            Err(_) => {
                if let Ok(link) = fs::read_link(ancestor) {
                    let parent = ancestor.parent().unwrap_or(base);
                    if !parent.join(link).clean().starts_with(base) {
                        return Err(StorageError::InvalidPath(shown.to_string()));
                    }
                }
            }
        }
    }

    Err(StorageError::InvalidPath(shown.to_string()))
}
