//! Sandbox root
//!
//! Resolves and lazily creates the single directory every operation is
//! confined to.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::StorageError;

#[cfg(windows)]
const DEFAULT_ROOT: &str = r"D:\data";
#[cfg(not(windows))]
const DEFAULT_ROOT: &str = "/var/opt/rax-file-manager/data";

/// The sandbox boundary. Constructed once and shared by every operation.
#[derive(Debug)]
pub struct SandboxRoot {
    configured: PathBuf,
    canonical: OnceLock<PathBuf>,
}

impl SandboxRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            configured: path.into(),
            canonical: OnceLock::new(),
        }
    }

    /// Root at the platform default location
    pub fn platform_default() -> Self {
        Self::new(DEFAULT_ROOT)
    }

    /// Location as configured, before canonicalization
    pub fn configured_path(&self) -> &Path {
        &self.configured
    }

    /// Returns the canonical root, creating it (and missing parents) on first use.
    pub fn resolve(&self) -> Result<&Path, StorageError> {
        if let Some(path) = self.canonical.get() {
            return Ok(path);
        }

        fs::create_dir_all(&self.configured)?;
        let canonical = self.configured.canonicalize()?;
        info!(
            "Sandbox root ready: {} (configured: {})",
            canonical.display(),
            self.configured.display()
        );

        Ok(self.canonical.get_or_init(|| canonical))
    }

    /// Recreates the root directory if it was removed from under us.
    pub(crate) fn ensure_exists(&self) -> Result<&Path, StorageError> {
        let root = self.resolve()?;
        if !root.is_dir() {
            fs::create_dir_all(root)?;
        }
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolve_creates_missing_root() {
        let tmp = tempdir().unwrap();
        let root = SandboxRoot::new(tmp.path().join("nested/data"));

        let resolved = root.resolve().unwrap().to_path_buf();
        assert!(resolved.is_dir());
        assert!(resolved.is_absolute());
    }

    #[test]
    fn resolve_is_idempotent() {
        let tmp = tempdir().unwrap();
        let root = SandboxRoot::new(tmp.path());

        let first = root.resolve().unwrap().to_path_buf();
        let second = root.resolve().unwrap().to_path_buf();
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_exists_recreates_deleted_root() {
        let tmp = tempdir().unwrap();
        let root = SandboxRoot::new(tmp.path().join("data"));
        let resolved = root.resolve().unwrap().to_path_buf();

        fs::remove_dir_all(&resolved).unwrap();
        root.ensure_exists().unwrap();
        assert!(resolved.is_dir());
    }

    #[test]
    fn platform_default_is_absolute() {
        let root = SandboxRoot::platform_default();
        assert!(root.configured_path().is_absolute());
    }
}
