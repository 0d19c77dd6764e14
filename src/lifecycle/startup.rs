//! Startup orchestration.
//!
//! # Responsibilities
//! - Make sure the shared and upload directories exist
//! - Tell the user where the share can be reached
//!
//! # Design Decisions
//! - Fail fast: a missing directory is fatal unless creation is enabled
//! - Runs before the listener is bound, so traffic only arrives when ready

use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::StorageConfig;
use crate::net::interfaces::reachable_urls;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory {0} does not exist")]
    MissingDir(PathBuf),

    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),
}

/// Ensure the shared root and upload directory exist.
pub fn prepare_storage(config: &StorageConfig) -> Result<(), StartupError> {
    ensure_dir(&config.root_dir, config.create_missing)?;
    if let Some(upload_dir) = &config.upload_dir {
        ensure_dir(upload_dir, config.create_missing)?;
    }
    Ok(())
}

fn ensure_dir(path: &Path, create: bool) -> Result<(), StartupError> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(StartupError::NotADirectory(path.to_path_buf()));
    }
    if !create {
        return Err(StartupError::MissingDir(path.to_path_buf()));
    }

    std::fs::create_dir_all(path).map_err(|source| StartupError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Created directory");
    Ok(())
}

/// Log every URL the server can be reached at, returning them.
pub fn announce(local_addr: SocketAddr) -> Vec<String> {
    let urls = reachable_urls(local_addr);
    for url in &urls {
        tracing::info!(url = %url, "Share available");
    }
    urls
}
