//! Response handling
//!
//! Every response is one JSON object on one line.

use serde::Serialize;

use crate::error::{ErrorBody, ServerError};
use crate::storage::{DirectoryEntry, EntrySummary};
use crate::transfer::{DownloadMetadata, Preview};

const FALLBACK_ERROR_LINE: &str =
    "{\"error\":{\"kind\":\"internal\",\"code\":500,\"message\":\"response encoding failed\"}}\n";

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Listing {
        items: Vec<DirectoryEntry>,
    },
    Completed {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<EntrySummary>,
    },
    Uploaded {
        success: bool,
        filename: String,
        size: u64,
    },
    Download(DownloadMetadata),
    Preview(Preview),
    SystemInfo {
        os: &'static str,
        root_dir: String,
    },
    Error {
        error: ErrorBody,
    },
}

impl Response {
    pub fn success() -> Self {
        Response::Completed {
            success: true,
            result: None,
        }
    }

    pub fn with_result(result: EntrySummary) -> Self {
        Response::Completed {
            success: true,
            result: Some(result),
        }
    }

    /// Logs the error and wraps it for the caller.
    pub fn error(err: &ServerError) -> Self {
        Response::Error {
            error: crate::error::handle_error(err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Newline-terminated JSON line
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(_) => FALLBACK_ERROR_LINE.to_string(),
        }
    }
}
