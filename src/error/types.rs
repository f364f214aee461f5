//! Error types
//!
//! Defines domain-specific error types for the storage engine, the request
//! protocol and the server as a whole.

use std::io;

use thiserror::Error;

/// Storage and transfer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("File too large to preview: {path} ({size} bytes, limit {limit} bytes)")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("Unsupported preview type: {0}")]
    UnsupportedPreviewType(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Request protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Request too long: {0} bytes")]
    RequestTooLong(usize),

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::MalformedRequest(error.to_string())
    }
}

/// General server error that encompasses all error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Too many connections (limit {0})")]
    Busy(usize),
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(error: tokio::task::JoinError) -> Self {
        ServerError::Task(error.to_string())
    }
}
