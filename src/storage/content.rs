//! File content access
//!
//! Bounded text reads and unbounded overwriting writes of a single file.
//! The read cap protects memory; writes deliberately have no cap.

use log::info;
use std::fs;
use std::io::Write;

use crate::error::StorageError;
use crate::storage::filesystem::{WritePolicy, open_for_write};
use crate::storage::results::EntrySummary;
use crate::storage::root::SandboxRoot;
use crate::storage::validation::{resolve_entry, virtual_path};

/// Largest file `read_file` will load (10 MB).
pub const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Returned instead of the bytes of a file that is not valid UTF-8.
pub const BINARY_PREVIEW_PLACEHOLDER: &str = "Binary file, content cannot be previewed";

/// Reads a file as UTF-8 text.
pub fn read_file(root: &SandboxRoot, path: &str, filename: &str) -> Result<String, StorageError> {
    let file_path = resolve_entry(root, path, filename)?;
    let shown = virtual_path(path, filename);

    let metadata = match fs::metadata(&file_path) {
        Ok(metadata) => metadata,
        Err(_) => return Err(StorageError::NotFound(shown)),
    };
    if metadata.is_dir() {
        return Err(StorageError::IsADirectory(shown));
    }
    if metadata.len() > MAX_READ_SIZE {
        return Err(StorageError::TooLarge {
            path: shown,
            size: metadata.len(),
            limit: MAX_READ_SIZE,
        });
    }

    let bytes = fs::read(&file_path)?;
    let size = bytes.len();
    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => {
            info!("Read {} ({} bytes): not UTF-8, returning placeholder", shown, size);
            return Ok(BINARY_PREVIEW_PLACEHOLDER.to_string());
        }
    };

    info!("Read {} ({} bytes)", shown, size);
    Ok(content)
}

/// Writes `content` to a file, creating or fully replacing it.
pub fn write_file(
    root: &SandboxRoot,
    path: &str,
    filename: &str,
    content: &str,
) -> Result<EntrySummary, StorageError> {
    let file_path = resolve_entry(root, path, filename)?;
    let shown = virtual_path(path, filename);

    if file_path.is_dir() {
        return Err(StorageError::IsADirectory(shown));
    }

    let mut file = open_for_write(&file_path, WritePolicy::Overwrite, &shown)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    info!(
        "Saved {} ({} bytes, real: {})",
        shown,
        content.len(),
        file_path.display()
    );

    Ok(EntrySummary::named(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::operations::{create_directory, create_file};
    use std::fs::File;
    use tempfile::{TempDir, tempdir};

    fn sandbox() -> (TempDir, SandboxRoot) {
        let tmp = tempdir().unwrap();
        let root = SandboxRoot::new(tmp.path());
        (tmp, root)
    }

    #[test]
    fn created_file_reads_back_exactly() {
        let (_tmp, root) = sandbox();
        create_file(&root, "", "x.txt", "hello").unwrap();

        assert_eq!(read_file(&root, "", "x.txt").unwrap(), "hello");
    }

    #[test]
    fn oversized_file_is_too_large() {
        let (_tmp, root) = sandbox();
        let path = root.resolve().unwrap().join("big.log");
        // Sparse file: the size check must not depend on the content.
        File::create(&path).unwrap().set_len(MAX_READ_SIZE + 1).unwrap();

        match read_file(&root, "", "big.log") {
            Err(StorageError::TooLarge { size, limit, .. }) => {
                assert_eq!(size, MAX_READ_SIZE + 1);
                assert_eq!(limit, MAX_READ_SIZE);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn file_at_the_limit_is_readable() {
        let (_tmp, root) = sandbox();
        let path = root.resolve().unwrap().join("edge.txt");
        File::create(&path).unwrap().set_len(MAX_READ_SIZE).unwrap();

        assert_eq!(read_file(&root, "", "edge.txt").unwrap().len() as u64, MAX_READ_SIZE);
    }

    #[test]
    fn invalid_utf8_returns_placeholder() {
        let (_tmp, root) = sandbox();
        let path = root.resolve().unwrap().join("image.bin");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        assert_eq!(
            read_file(&root, "", "image.bin").unwrap(),
            BINARY_PREVIEW_PLACEHOLDER
        );
    }

    #[test]
    fn reading_missing_or_directory_fails() {
        let (_tmp, root) = sandbox();
        create_directory(&root, "", "docs").unwrap();

        assert!(matches!(
            read_file(&root, "", "ghost.txt"),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            read_file(&root, "", "docs"),
            Err(StorageError::IsADirectory(_))
        ));
    }

    #[test]
    fn write_creates_then_replaces() {
        let (_tmp, root) = sandbox();
        write_file(&root, "", "notes.md", "v1 is longer").unwrap();
        write_file(&root, "", "notes.md", "v2").unwrap();

        assert_eq!(read_file(&root, "", "notes.md").unwrap(), "v2");
    }

    #[test]
    fn write_has_no_size_cap() {
        let (_tmp, root) = sandbox();
        let big = "a".repeat((MAX_READ_SIZE + 16) as usize);

        write_file(&root, "", "huge.txt", &big).unwrap();

        let size = fs::metadata(root.resolve().unwrap().join("huge.txt")).unwrap().len();
        assert_eq!(size, MAX_READ_SIZE + 16);
        assert!(matches!(
            read_file(&root, "", "huge.txt"),
            Err(StorageError::TooLarge { .. })
        ));
    }

    #[test]
    fn write_onto_directory_fails() {
        let (_tmp, root) = sandbox();
        create_directory(&root, "", "docs").unwrap();

        assert!(matches!(
            write_file(&root, "", "docs", "x"),
            Err(StorageError::IsADirectory(_))
        ));
    }
}
