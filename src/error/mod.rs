//! Error handling
//!
//! Defines error types and the mapping to caller-visible failures.

pub mod handlers;
pub mod types;

pub use handlers::{ErrorBody, handle_error};
pub use types::*;
