//! Request handlers
//!
//! Dispatches parsed requests to the storage and transfer operations. Every
//! handler is synchronous; the session runs them on the blocking pool.

use std::io::Read;

use crate::error::{ProtocolError, ServerError, StorageError};
use crate::protocol::commands::{EntryOperation, OperationRequest, Request, TransferRequest};
use crate::protocol::responses::Response;
use crate::storage::{
    self, EntrySummary, SandboxRoot, create_directory, create_file, delete_entry, rename_entry,
};
use crate::transfer::{self, DownloadHandle};

/// Handles every request that has no raw byte payload.
pub fn handle_request(root: &SandboxRoot, request: Request) -> Result<Response, ServerError> {
    match request {
        Request::List { path } => handle_list(root, &path),
        Request::Operation(op) => handle_operation(root, op),
        Request::Preview { path, filename } => handle_preview(root, &path, &filename),
        Request::Save {
            path,
            filename,
            content,
        } => handle_save(root, &path, &filename, &content),
        Request::Move(req) => handle_move(root, &req),
        Request::Copy(req) => handle_copy(root, &req),
        Request::SystemInfo => handle_system_info(root),
        Request::Upload { .. } | Request::Download { .. } => Err(ProtocolError::MalformedRequest(
            "upload and download require a data stream".into(),
        )
        .into()),
    }
}

fn handle_list(root: &SandboxRoot, path: &str) -> Result<Response, ServerError> {
    let items = storage::list_directory(root, path)?;
    Ok(Response::Listing { items })
}

fn handle_operation(root: &SandboxRoot, request: OperationRequest) -> Result<Response, ServerError> {
    let (path, operation) = request.into_operation()?;
    let result = apply_operation(root, &path, operation)?;
    Ok(Response::with_result(result))
}

/// Runs one entry mutation inside `path`.
pub fn apply_operation(
    root: &SandboxRoot,
    path: &str,
    operation: EntryOperation,
) -> Result<EntrySummary, StorageError> {
    match operation {
        EntryOperation::CreateDirectory { name } => create_directory(root, path, &name),
        EntryOperation::Rename { old_name, new_name } => {
            rename_entry(root, path, &old_name, &new_name)
        }
        EntryOperation::Delete { name } => delete_entry(root, path, &name),
        EntryOperation::CreateFile { name, content } => create_file(root, path, &name, &content),
    }
}

fn handle_preview(root: &SandboxRoot, path: &str, filename: &str) -> Result<Response, ServerError> {
    let preview = transfer::preview(root, path, filename)?;
    Ok(Response::Preview(preview))
}

fn handle_save(
    root: &SandboxRoot,
    path: &str,
    filename: &str,
    content: &str,
) -> Result<Response, ServerError> {
    let result = storage::write_file(root, path, filename, content)?;
    Ok(Response::with_result(result))
}

fn handle_move(root: &SandboxRoot, req: &TransferRequest) -> Result<Response, ServerError> {
    transfer::move_entry(root, &req.source_path, &req.source_name, &req.target_path)?;
    Ok(Response::success())
}

fn handle_copy(root: &SandboxRoot, req: &TransferRequest) -> Result<Response, ServerError> {
    transfer::copy_entry(root, &req.source_path, &req.source_name, &req.target_path)?;
    Ok(Response::success())
}

fn handle_system_info(root: &SandboxRoot) -> Result<Response, ServerError> {
    let root_dir = root.resolve()?.display().to_string();
    Ok(Response::SystemInfo {
        os: os_family(),
        root_dir,
    })
}

/// Stores an upload read from `reader`.
pub fn handle_upload<R: Read>(
    root: &SandboxRoot,
    path: &str,
    filename: &str,
    reader: R,
) -> Result<Response, ServerError> {
    let result = transfer::upload(root, path, filename, reader)?;
    Ok(Response::Uploaded {
        success: true,
        filename: result.filename,
        size: result.size,
    })
}

/// Opens a download; the caller streams `handle.file` after the response line.
pub fn handle_download(
    root: &SandboxRoot,
    path: &str,
    filename: &str,
) -> Result<(Response, DownloadHandle), ServerError> {
    if filename.is_empty() {
        return Err(ProtocolError::MissingField("filename").into());
    }
    let handle = transfer::download(root, path, filename)?;
    Ok((Response::Download(handle.metadata()), handle))
}

/// Host operating system family name.
pub fn os_family() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "linux" => "Linux",
        "macos" => "Darwin",
        other => other,
    }
}
