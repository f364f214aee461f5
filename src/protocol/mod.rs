//! Line protocol implementation
//!
//! Handles request parsing, dispatch, and response generation.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{EntryOperation, OperationKind, Request};
pub use handlers::{handle_download, handle_request, handle_upload};
pub use parser::parse_request;
pub use responses::Response;
