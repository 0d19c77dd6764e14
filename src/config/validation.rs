//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chunk size, body limit, log level)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ShareConfig → Result<(), Vec<ValidationError>>
//! - Filesystem state is checked at startup, not here

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ShareConfig;

/// Largest streaming buffer accepted.
const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("storage.root_dir must not be empty")]
    EmptyRootDir,

    #[error("storage.upload_dir must not be empty when set")]
    EmptyUploadDir,

    #[error("transfer.chunk_size must be between 1 byte and 16 MiB, got {0}")]
    ChunkSize(usize),

    #[error("transfer.max_body_bytes must be greater than 0 when set")]
    ZeroBodyLimit,

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ShareConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.storage.root_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRootDir);
    }
    if config
        .storage
        .upload_dir
        .as_ref()
        .is_some_and(|dir| dir.as_os_str().is_empty())
    {
        errors.push(ValidationError::EmptyUploadDir);
    }

    let chunk_size = config.transfer.chunk_size;
    if chunk_size == 0 || chunk_size > MAX_CHUNK_SIZE {
        errors.push(ValidationError::ChunkSize(chunk_size));
    }
    if config.transfer.max_body_bytes == Some(0) {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
