//! Upload intake: from a decoded multipart body to a stored file.
//!
//! # Data Flow
//! ```text
//! MultipartDecoder
//!     → first part with a non-empty filename
//!     → upload_file_name (last path segment)
//!     → SharedRoot::resolve (upload root)
//!     → stage_upload (temp file)
//!     → drain remaining parts (framing must be valid)
//!     → commit (rename into place)
//! ```
//!
//! # Design Decisions
//! - Nothing becomes visible before the whole body has been decoded
//! - Only the first file part is stored; later ones are skipped
//! - Plain form fields are read and discarded

use std::fmt::Display;
use std::path::PathBuf;

use bytes::Bytes;
use futures_util::Stream;

use crate::error::ShareError;
use crate::multipart::MultipartDecoder;
use crate::storage::resolver::{upload_file_name, SharedRoot};
use crate::storage::transfer::stage_upload;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Final file name under the upload root.
    pub name: String,
    pub path: PathBuf,
    /// Bytes written to disk.
    pub size: u64,
}

/// Store the first file part of `decoder` under `upload_root`.
pub async fn receive_upload<S, E>(
    decoder: &mut MultipartDecoder<S>,
    upload_root: &SharedRoot,
    chunk_size: usize,
) -> Result<StoredUpload, ShareError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut staged = None;

    while let Some(headers) = decoder.next_part().await? {
        if !headers.is_file() {
            tracing::debug!(field = headers.name().unwrap_or_default(), "Skipping form field");
            continue;
        }

        let raw_name = headers.filename().unwrap_or_default();
        if staged.is_some() {
            tracing::warn!(filename = %raw_name, "Ignoring additional file part");
            continue;
        }

        let name = upload_file_name(raw_name)?.to_string();
        let destination = upload_root.resolve(&name).await?;
        tracing::debug!(filename = %name, content_type = headers.content_type().unwrap_or_default(), "Receiving file part");

        let upload = stage_upload(decoder.payload(), &destination, chunk_size).await?;
        staged = Some((name, destination, upload));
    }

    let (name, destination, upload) = staged.ok_or(ShareError::NoFileProvided)?;
    let path = destination.as_path().to_path_buf();
    let size = upload.commit(destination).await?;

    Ok(StoredUpload { name, path, size })
}
