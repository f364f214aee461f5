//! Storage result types
//!
//! Defines result structures returned by storage operations.

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

/// Timestamp layout used on the wire for `modified_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One record of a directory listing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub modified_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<&'static str>,
}

/// Result of an entry mutation
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntrySummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dir: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl EntrySummary {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: None,
            size: None,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            is_dir: Some(true),
            ..Self::named(name)
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            is_dir: Some(false),
            ..Self::named(name)
        }
    }

    pub fn with_stat(name: impl Into<String>, is_dir: bool, size: u64) -> Self {
        Self {
            name: name.into(),
            is_dir: Some(is_dir),
            size: Some(size),
        }
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entry_serializes_formatted_timestamp_and_skips_missing_mimetype() {
        let entry = DirectoryEntry {
            name: "docs".into(),
            is_dir: true,
            size: 0,
            modified_at: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
            mimetype: None,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["modified_at"], "2024-03-09 14:05:07");
        assert!(json.get("mimetype").is_none());
    }

    #[test]
    fn summary_shapes() {
        let json = serde_json::to_value(EntrySummary::named("gone.txt")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "gone.txt"}));

        let json = serde_json::to_value(EntrySummary::with_stat("b.txt", false, 5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "b.txt", "is_dir": false, "size": 5})
        );
    }
}
