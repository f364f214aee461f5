//! Module `file_ops`
//!
//! Upload and download of whole files. Uploads are written in chunks to a
//! private staging file and renamed into place, replacing any existing file
//! of the same name. Downloads hand back an open file plus the metadata the
//! client needs.

use log::{error, info};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::StorageError;
use crate::storage::mime::content_type_for;
use crate::storage::root::SandboxRoot;
use crate::storage::validation::{resolve_entry, virtual_path};
use crate::transfer::results::{DownloadHandle, UploadResult};

/// Chunk size used when streaming uploads to disk
pub const BUFFER_SIZE: usize = 8192;

const STAGING_PREFIX: &str = ".upload-";
const STAGING_SUFFIX: &str = ".part";

/// Stores the bytes from `reader` as `path/filename`, silently overwriting.
///
/// The bytes are staged in a uniquely named hidden file in the same directory
/// and renamed over the target once complete. Only that staging file is ever
/// removed on failure.
pub fn upload<R: Read>(
    root: &SandboxRoot,
    path: &str,
    filename: &str,
    mut reader: R,
) -> Result<UploadResult, StorageError> {
    let file_path = resolve_entry(root, path, filename)?;
    let shown = virtual_path(path, filename);

    if file_path.is_dir() {
        return Err(StorageError::IsADirectory(shown));
    }

    let parent = file_path
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(shown.clone()))?;
    let mut staged = staging_file(parent, &shown)?;

    info!("Starting upload: {} -> {}", staged.path().display(), shown);

    let mut buffer = [0u8; BUFFER_SIZE];
    let mut total_bytes_received = 0u64;

    // Dropping `staged` on any early return deletes the staging file.
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Upload of {} aborted after {} bytes: {}", shown, total_bytes_received, e);
                return Err(StorageError::Io(e));
            }
        };

        if let Err(e) = staged.write_all(&buffer[..n]) {
            error!("Failed to write upload chunk for {}: {}", shown, e);
            return Err(StorageError::Io(e));
        }
        total_bytes_received += n as u64;
    }

    staged.flush()?;

    if let Err(e) = staged.persist(&file_path) {
        error!("Failed to move upload into place for {}: {}", shown, e.error);
        return Err(StorageError::Io(e.error));
    }

    info!("Upload completed: {} ({} bytes)", shown, total_bytes_received);

    Ok(UploadResult {
        filename: filename.to_string(),
        size: total_bytes_received,
    })
}

fn staging_file(dir: &Path, shown: &str) -> Result<NamedTempFile, StorageError> {
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(shown.to_string()),
            io::ErrorKind::NotADirectory => StorageError::NotADirectory(shown.to_string()),
            _ => StorageError::Io(e),
        })
}

/// Opens a file for download.
pub fn download(root: &SandboxRoot, path: &str, filename: &str) -> Result<DownloadHandle, StorageError> {
    let file_path = resolve_entry(root, path, filename)?;
    let shown = virtual_path(path, filename);

    if !file_path.is_file() {
        return Err(StorageError::NotFound(shown));
    }

    let file = File::open(&file_path)?;
    let size = file.metadata()?.len();

    info!("Starting download: {} ({} bytes)", shown, size);

    Ok(DownloadHandle {
        file,
        size,
        content_type: content_type_for(filename),
        filename_ascii: ascii_filename(filename),
        filename_utf8: urlencoding::encode(filename).into_owned(),
    })
}

/// Replaces every non-ASCII character with `?`.
pub fn ascii_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::content::read_file;
    use crate::storage::listing::list_directory;
    use crate::storage::operations::{create_directory, create_file};
    use std::fs;
    use std::io::Cursor;
    use tempfile::{TempDir, tempdir};

    fn sandbox() -> (TempDir, SandboxRoot) {
        let tmp = tempdir().unwrap();
        let root = SandboxRoot::new(tmp.path());
        (tmp, root)
    }

    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
            } else {
                self.sent = true;
                buf[..4].copy_from_slice(b"half");
                Ok(4)
            }
        }
    }

    #[test]
    fn upload_writes_all_chunks() {
        let (_tmp, root) = sandbox();
        let payload: Vec<u8> = (0..(BUFFER_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();

        let result = upload(&root, "", "data.bin", Cursor::new(payload.clone())).unwrap();

        assert_eq!(result.size, payload.len() as u64);
        let stored = fs::read(root.resolve().unwrap().join("data.bin")).unwrap();
        assert_eq!(stored, payload);
    }

    #[test]
    fn upload_overwrites_silently() {
        let (_tmp, root) = sandbox();
        create_file(&root, "", "a.txt", "old content").unwrap();

        upload(&root, "", "a.txt", Cursor::new(b"new".to_vec())).unwrap();

        assert_eq!(read_file(&root, "", "a.txt").unwrap(), "new");
        let names: Vec<_> = list_directory(&root, "")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.txt"]);
    }

    #[test]
    fn failed_upload_leaves_no_partial_file() {
        let (_tmp, root) = sandbox();

        let result = upload(&root, "", "broken.bin", FailingReader { sent: false });

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(list_directory(&root, "").unwrap().is_empty());
    }

    #[test]
    fn upload_leaves_similarly_named_files_alone() {
        let (_tmp, root) = sandbox();
        create_file(&root, "", "report.part", "user data").unwrap();

        upload(&root, "", "report", Cursor::new(b"new".to_vec())).unwrap();

        assert_eq!(read_file(&root, "", "report.part").unwrap(), "user data");
        assert_eq!(read_file(&root, "", "report").unwrap(), "new");
        let mut names: Vec<_> = list_directory(&root, "")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["report", "report.part"]);
    }

    #[test]
    fn failed_upload_keeps_similarly_named_files() {
        let (_tmp, root) = sandbox();
        create_file(&root, "", "broken.bin.part", "keep me").unwrap();

        let result = upload(&root, "", "broken.bin", FailingReader { sent: false });

        assert!(result.is_err());
        assert_eq!(read_file(&root, "", "broken.bin.part").unwrap(), "keep me");
        assert_eq!(list_directory(&root, "").unwrap().len(), 1);
    }

    #[test]
    fn upload_into_missing_directory_is_not_found() {
        let (_tmp, root) = sandbox();
        assert!(matches!(
            upload(&root, "missing", "a.txt", Cursor::new(b"x".to_vec())),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn upload_rejects_path_like_filenames() {
        let (_tmp, root) = sandbox();
        assert!(matches!(
            upload(&root, "", "../evil.sh", Cursor::new(Vec::new())),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn download_reports_metadata() {
        let (_tmp, root) = sandbox();
        create_file(&root, "", "report.pdf", "%PDF-1.4").unwrap();

        let mut handle = download(&root, "", "report.pdf").unwrap();
        assert_eq!(handle.size, 8);
        assert_eq!(handle.content_type, "application/pdf");

        let mut body = String::new();
        handle.file.read_to_string(&mut body).unwrap();
        assert_eq!(body, "%PDF-1.4");
    }

    #[test]
    fn download_unknown_type_is_octet_stream() {
        let (_tmp, root) = sandbox();
        create_file(&root, "", "blob.qqq", "").unwrap();

        let handle = download(&root, "", "blob.qqq").unwrap();
        assert_eq!(handle.content_type, "application/octet-stream");
    }

    #[test]
    fn download_filename_has_both_forms() {
        let (_tmp, root) = sandbox();
        create_file(&root, "", "résumé 1.txt", "cv").unwrap();

        let handle = download(&root, "", "résumé 1.txt").unwrap();
        assert_eq!(handle.filename_ascii, "r?sum? 1.txt");
        assert_eq!(handle.filename_utf8, "r%C3%A9sum%C3%A9%201.txt");
        assert_eq!(
            handle.content_disposition(),
            "attachment; filename=\"r?sum? 1.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9%201.txt"
        );
    }

    #[test]
    fn download_of_directory_or_missing_is_not_found() {
        let (_tmp, root) = sandbox();
        create_directory(&root, "", "docs").unwrap();

        assert!(matches!(
            download(&root, "", "docs"),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            download(&root, "", "ghost.txt"),
            Err(StorageError::NotFound(_))
        ));
    }
}
