//! Client session handling
//!
//! Serves a single connection: request lines in, response lines out.

pub mod handler;

pub use handler::handle_client;
