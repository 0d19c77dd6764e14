//! Streaming transfer between storage and the network.
//!
//! # Responsibilities
//! - Stream a stored file to a client in bounded chunks
//! - Persist an upload payload stream to disk in bounded chunks
//!
//! # Design Decisions
//! - Download length is read from the opened handle, and the stream is capped
//!   to it, so the declared length always matches the bytes sent
//! - Uploads land in a hidden temp file and are renamed into place; the temp
//!   file is removed on every failure path, including the future being dropped
//! - The byte count written is the only trusted upload size

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter, Take};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::{is_missing, ShareError};
use crate::storage::resolver::ResolvedPath;

/// Name prefix of in-progress upload files.
pub const UPLOAD_TEMP_PREFIX: &str = ".lanshare-upload-";

const UPLOAD_TEMP_SUFFIX: &str = ".part";

pub(crate) fn is_upload_temp_name(name: &str) -> bool {
    name.starts_with(UPLOAD_TEMP_PREFIX) && name.ends_with(UPLOAD_TEMP_SUFFIX)
}

/// An open file ready to be streamed to a client.
///
/// Dropping the stream closes the file.
pub struct Download {
    pub file_name: String,
    pub size: u64,
    pub stream: ReaderStream<Take<File>>,
}

/// Open `source` for streaming. The size is taken from the open handle.
///
/// Anything that is not a regular file is `NotFound`. The type is checked
/// before opening: opening a FIFO blocks until a writer appears.
pub async fn transfer_to_client(
    source: ResolvedPath,
    chunk_size: usize,
) -> Result<Download, ShareError> {
    let file_name = source.file_name().unwrap_or("download").to_string();
    let path = source.into_path_buf();
    let not_found = || ShareError::NotFound(path.display().to_string());

    let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
        if is_missing(&e) {
            not_found()
        } else {
            ShareError::StorageUnavailable(e)
        }
    })?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    let file = File::open(&path).await.map_err(|e| {
        if is_missing(&e) {
            not_found()
        } else {
            ShareError::StorageUnavailable(e)
        }
    })?;

    // The entry may have been replaced between the stat and the open.
    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    let size = metadata.len();
    tracing::debug!(path = %path.display(), size, "Streaming file to client");

    Ok(Download {
        file_name,
        size,
        stream: ReaderStream::with_capacity(file.take(size), chunk_size),
    })
}

/// Write `payload` to `destination`, returning the number of bytes stored.
pub async fn transfer_to_storage<S>(
    payload: S,
    destination: ResolvedPath,
    chunk_size: usize,
) -> Result<u64, ShareError>
where
    S: Stream<Item = Result<Bytes, ShareError>>,
{
    stage_upload(payload, &destination, chunk_size)
        .await?
        .commit(destination)
        .await
}

/// Write `payload` next to `destination` without making it visible yet.
pub async fn stage_upload<S>(
    payload: S,
    destination: &ResolvedPath,
    chunk_size: usize,
) -> Result<StagedUpload, ShareError>
where
    S: Stream<Item = Result<Bytes, ShareError>>,
{
    let directory = destination
        .as_path()
        .parent()
        .ok_or_else(|| ShareError::PathEscape(destination.as_path().display().to_string()))?;

    let mut upload = PartialUpload::create(directory, chunk_size).await?;
    let mut size: u64 = 0;

    futures_util::pin_mut!(payload);
    while let Some(chunk) = payload.try_next().await? {
        upload.write(&chunk).await?;
        size += chunk.len() as u64;
    }
    upload.finish().await?;

    Ok(StagedUpload { upload, size })
}

/// A fully written upload waiting to be renamed into place.
///
/// Dropping it discards the data.
pub struct StagedUpload {
    upload: PartialUpload,
    size: u64,
}

impl StagedUpload {
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Move the staged file over `destination`. An existing file is replaced.
    pub async fn commit(mut self, destination: ResolvedPath) -> Result<u64, ShareError> {
        let destination = destination.into_path_buf();
        tokio::fs::rename(&self.upload.temp_path, &destination).await?;
        self.upload.committed = true;

        tracing::info!(path = %destination.display(), size = self.size, "Upload stored");
        Ok(self.size)
    }
}

/// Temp file guard. Removes the file on drop unless committed.
struct PartialUpload {
    temp_path: PathBuf,
    writer: Option<BufWriter<File>>,
    committed: bool,
}

impl PartialUpload {
    async fn create(directory: &Path, chunk_size: usize) -> Result<Self, ShareError> {
        let temp_path = directory.join(format!(
            "{UPLOAD_TEMP_PREFIX}{}{UPLOAD_TEMP_SUFFIX}",
            Uuid::new_v4().simple()
        ));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .await?;

        Ok(Self {
            temp_path,
            writer: Some(BufWriter::with_capacity(chunk_size, file)),
            committed: false,
        })
    }

    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.write_all(chunk).await,
            None => Err(io::Error::other("upload file already closed")),
        }
    }

    /// Flush and sync, then close the handle.
    async fn finish(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            writer.into_inner().sync_all().await?;
        }
        Ok(())
    }
}

impl Drop for PartialUpload {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.writer.take());
        if let Err(e) = std::fs::remove_file(&self.temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.temp_path.display(), error = %e, "Failed to remove partial upload");
            }
        } else {
            tracing::debug!(path = %self.temp_path.display(), "Partial upload discarded");
        }
    }
}
