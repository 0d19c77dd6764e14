//! Storage subsystem: everything that touches the shared directories.
//!
//! # Data Flow
//! ```text
//! client name
//!     → resolver.rs (normalize, canonicalize, containment check)
//!     → ResolvedPath (moved into exactly one transfer)
//!     → transfer.rs (stream to client / stage and commit upload)
//!
//! listing request
//!     → listing.rs (immediate children, sorted)
//!
//! multipart body
//!     → upload.rs (pick file part, resolve, stage, commit)
//! ```

pub mod listing;
pub mod resolver;
pub mod transfer;
pub mod upload;

pub use listing::{list, DirectoryEntry, EntryKind, Listing};
pub use resolver::{upload_file_name, ResolvedPath, SharedRoot};
pub use transfer::{transfer_to_client, transfer_to_storage, Download};
pub use upload::{receive_upload, StoredUpload};
