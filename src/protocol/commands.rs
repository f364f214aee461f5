//! Module `commands`
//!
//! Request types of the line protocol. Every request is one JSON object
//! tagged by `action`; entry mutations are further selected by `operation`.

use serde::Deserialize;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Every `action` the server understands.
pub const ACTIONS: &[&str] = &[
    "list",
    "operation",
    "upload",
    "download",
    "preview",
    "save",
    "move",
    "copy",
    "system_info",
];

/// A parsed client request.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    List {
        #[serde(default)]
        path: String,
    },
    Operation(OperationRequest),
    /// Followed on the wire by exactly `size` raw bytes.
    Upload {
        #[serde(default)]
        path: String,
        filename: String,
        size: u64,
    },
    Download {
        #[serde(default)]
        path: String,
        filename: String,
    },
    Preview {
        #[serde(default)]
        path: String,
        filename: String,
    },
    Save {
        #[serde(default)]
        path: String,
        filename: String,
        #[serde(default)]
        content: String,
    },
    Move(TransferRequest),
    Copy(TransferRequest),
    SystemInfo,
}

/// Raw `operation` request, before the kind is checked.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct OperationRequest {
    #[serde(default)]
    pub path: String,
    /// Empty when omitted; rejected as an unsupported kind.
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub old_name: String,
    #[serde(default)]
    pub new_name: String,
    #[serde(default)]
    pub content: String,
}

/// Source and destination of a move or copy.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct TransferRequest {
    #[serde(default)]
    pub source_path: String,
    pub source_name: String,
    #[serde(default)]
    pub target_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CreateDirectory,
    Rename,
    Delete,
    CreateFile,
}

impl FromStr for OperationKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_directory" => Ok(OperationKind::CreateDirectory),
            "rename" => Ok(OperationKind::Rename),
            "delete" => Ok(OperationKind::Delete),
            "create_file" => Ok(OperationKind::CreateFile),
            other => Err(ProtocolError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// A checked entry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOperation {
    CreateDirectory { name: String },
    Rename { old_name: String, new_name: String },
    Delete { name: String },
    CreateFile { name: String, content: String },
}

impl OperationRequest {
    /// Splits into the target directory and the typed operation.
    pub fn into_operation(self) -> Result<(String, EntryOperation), ProtocolError> {
        let operation = match self.operation.parse::<OperationKind>()? {
            OperationKind::CreateDirectory => EntryOperation::CreateDirectory { name: self.name },
            OperationKind::Rename => EntryOperation::Rename {
                old_name: self.old_name,
                new_name: self.new_name,
            },
            OperationKind::Delete => EntryOperation::Delete { name: self.name },
            OperationKind::CreateFile => EntryOperation::CreateFile {
                name: self.name,
                content: self.content,
            },
        };
        Ok((self.path, operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(kind: &str) -> OperationRequest {
        OperationRequest {
            path: "docs".into(),
            operation: kind.into(),
            name: "n".into(),
            old_name: "o".into(),
            new_name: "m".into(),
            content: "c".into(),
        }
    }

    #[test]
    fn known_kinds_build_typed_operations() {
        assert_eq!(
            op("rename").into_operation().unwrap(),
            (
                "docs".to_string(),
                EntryOperation::Rename {
                    old_name: "o".into(),
                    new_name: "m".into()
                }
            )
        );
        assert_eq!(
            op("create_file").into_operation().unwrap().1,
            EntryOperation::CreateFile {
                name: "n".into(),
                content: "c".into()
            }
        );
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        match op("chmod").into_operation() {
            Err(ProtocolError::UnsupportedOperation(kind)) => assert_eq!(kind, "chmod"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
