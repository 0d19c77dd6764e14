//! Error taxonomy for the sharing core.
//!
//! Every component (resolver, listing, multipart, transfer) reports failures
//! as a [`ShareError`]. Only the HTTP layer translates them into status codes.

use std::io;

use thiserror::Error;

/// Errors produced by the sharing core.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The requested name would resolve outside the shared root.
    #[error("path escapes the shared root: {0}")]
    PathEscape(String),

    /// The filesystem failed for reasons unrelated to the request itself.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] io::Error),

    /// The body does not follow multipart framing for the declared boundary.
    #[error("malformed multipart body: {0}")]
    MalformedMultipart(String),

    /// The multipart body is well formed but carries no file part.
    #[error("no file found in upload")]
    NoFileProvided,

    /// The resolved path does not reference an existing file.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ShareError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ShareError::MalformedMultipart(reason.into())
    }

    /// Short machine-readable tag, used as a metrics label and log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ShareError::PathEscape(_) => "path_escape",
            ShareError::StorageUnavailable(_) => "storage_unavailable",
            ShareError::MalformedMultipart(_) => "malformed_multipart",
            ShareError::NoFileProvided => "no_file_provided",
            ShareError::NotFound(_) => "not_found",
        }
    }
}

/// Returns true for I/O errors meaning "nothing is there".
pub(crate) fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
