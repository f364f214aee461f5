//! File system storage management
//!
//! Sandbox root, path validation, directory listing, entry mutation and
//! bounded content access.

pub mod content;
pub mod filesystem;
pub mod listing;
pub mod mime;
pub mod operations;
pub mod results;
pub mod root;
pub mod validation;

pub use content::{BINARY_PREVIEW_PLACEHOLDER, MAX_READ_SIZE, read_file, write_file};
pub use filesystem::WritePolicy;
pub use listing::list_directory;
pub use operations::{create_directory, create_file, delete_entry, rename_entry};
pub use results::{DirectoryEntry, EntrySummary};
pub use root::SandboxRoot;
pub use validation::{validate_name, validate_path};
