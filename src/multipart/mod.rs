//! Streaming `multipart/form-data` decoding.
//!
//! # Data Flow
//! ```text
//! Content-Type header → boundary.rs (boundary parameter)
//! body stream ────────→ decoder.rs (delimiter scan, part framing)
//!                           → headers.rs (per-part header block)
//!                           → payload chunks (raw bytes, never decoded)
//! ```

pub mod boundary;
pub mod decoder;
pub mod headers;

pub use boundary::boundary_from_content_type;
pub use decoder::MultipartDecoder;
pub use headers::PartHeaders;
