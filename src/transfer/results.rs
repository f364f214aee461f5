//! Transfer result types
//!
//! Defines result structures returned by transfer operations.

use serde::Serialize;
use std::fs::File;

/// Result of an upload
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UploadResult {
    pub filename: String,
    pub size: u64,
}

/// An opened file ready to be streamed to a client, with the metadata the
/// client needs to save it.
#[derive(Debug)]
pub struct DownloadHandle {
    pub file: File,
    pub size: u64,
    pub content_type: &'static str,
    /// Non-ASCII characters replaced by `?`, for legacy clients
    pub filename_ascii: String,
    /// Percent-encoded UTF-8, for RFC 5987 aware clients
    pub filename_utf8: String,
}

impl DownloadHandle {
    /// `Content-Disposition` value carrying both filename forms.
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            self.filename_ascii.replace('\\', "\\\\").replace('"', "\\\""),
            self.filename_utf8
        )
    }

    pub fn metadata(&self) -> DownloadMetadata {
        DownloadMetadata {
            content_type: self.content_type,
            filename_ascii: self.filename_ascii.clone(),
            filename_utf8: self.filename_utf8.clone(),
            content_disposition: self.content_disposition(),
            size: self.size,
        }
    }
}

/// Serializable part of a [`DownloadHandle`]
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DownloadMetadata {
    pub content_type: &'static str,
    pub filename_ascii: String,
    pub filename_utf8: String,
    pub content_disposition: String,
    pub size: u64,
}

/// How a file can be previewed
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Text,
    Image,
    Pdf,
}

/// Result of a preview. Only text previews carry content; images and
/// documents are fetched separately by the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Preview {
    #[serde(rename = "type")]
    pub kind: PreviewKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
