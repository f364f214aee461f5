//! Server core functionality
//!
//! Accept loop and connection limits for the file manager service.

pub mod core;

pub use core::Server;
