//! Transfer module
//!
//! Moves and copies between sandboxed locations, streams uploads and
//! downloads, and classifies previews.

pub mod file_ops;
pub mod operations;
pub mod preview;
pub mod results;
pub mod stream;

// Re-export key types and functions
pub use file_ops::{BUFFER_SIZE, download, upload};
pub use operations::{copy_entry, move_entry};
pub use preview::{classify_preview, preview};
pub use results::{DownloadHandle, DownloadMetadata, Preview, PreviewKind, UploadResult};
pub use stream::{ChannelReader, ChunkSender, chunk_channel};
