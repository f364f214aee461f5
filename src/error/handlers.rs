//! Error handlers
//!
//! Maps errors onto the structured failure object returned to callers.

use log::error;
use serde::Serialize;

use crate::error::types::{ProtocolError, ServerError, StorageError};

/// Failure body sent to the caller. Carries no stack trace.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub code: u16,
    pub message: String,
}

impl From<&ServerError> for ErrorBody {
    fn from(err: &ServerError) -> Self {
        Self {
            kind: error_kind(err),
            code: error_to_status_code(err),
            message: err_message(err),
        }
    }
}

/// Handle a server error
pub fn handle_error(err: &ServerError) -> ErrorBody {
    error!("File manager error: {}", err);
    ErrorBody::from(err)
}

/// Stable snake_case name of the failure kind
pub fn error_kind(err: &ServerError) -> &'static str {
    match err {
        ServerError::Storage(e) => match e {
            StorageError::InvalidPath(_) => "invalid_path",
            StorageError::NotFound(_) => "not_found",
            StorageError::AlreadyExists(_) => "already_exists",
            StorageError::IsADirectory(_) => "is_a_directory",
            StorageError::NotADirectory(_) => "not_a_directory",
            StorageError::TooLarge { .. } => "too_large",
            StorageError::UnsupportedPreviewType(_) => "unsupported_preview_type",
            StorageError::Io(_) => "io",
        },
        ServerError::Protocol(e) => match e {
            ProtocolError::MalformedRequest(_) | ProtocolError::MissingField(_) => {
                "malformed_request"
            }
            ProtocolError::UnsupportedOperation(_) => "unsupported_operation",
            ProtocolError::RequestTooLong(_) => "request_too_long",
        },
        ServerError::Busy(_) => "busy",
        ServerError::Config(_) | ServerError::Io(_) | ServerError::Task(_) => "internal",
    }
}

/// Convert error to an HTTP-style status code
pub fn error_to_status_code(err: &ServerError) -> u16 {
    match err {
        ServerError::Storage(e) => match e {
            StorageError::InvalidPath(_)
            | StorageError::IsADirectory(_)
            | StorageError::NotADirectory(_) => 400,
            StorageError::NotFound(_) => 404,
            StorageError::AlreadyExists(_) => 409,
            StorageError::TooLarge { .. } => 413,
            StorageError::UnsupportedPreviewType(_) => 415,
            StorageError::Io(_) => 500,
        },
        ServerError::Protocol(ProtocolError::RequestTooLong(_)) => 413,
        ServerError::Protocol(_) => 400,
        ServerError::Busy(_) => 503,
        ServerError::Config(_) | ServerError::Io(_) | ServerError::Task(_) => 500,
    }
}

// Storage errors are shown without the outer "Storage error:" prefix.
fn err_message(err: &ServerError) -> String {
    match err {
        ServerError::Storage(e) => e.to_string(),
        ServerError::Protocol(e) => e.to_string(),
        other => other.to_string(),
    }
}
