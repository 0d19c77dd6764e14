//! Safe path resolution under a shared root.
//!
//! # Responsibilities
//! - Reject client names that are absolute or climb above the root
//! - Lexically normalize names before touching the filesystem
//! - Canonicalize the result and verify it still lies under the root
//!
//! # Design Decisions
//! - Ambiguous input is rejected, never re-rooted
//! - `\` is treated as a separator on every platform
//! - Nothing is cached: each call re-checks the symlink topology

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::error::{is_missing, ShareError};

/// A canonical directory that resolved paths must stay inside.
#[derive(Debug, Clone)]
pub struct SharedRoot {
    path: PathBuf,
}

/// A path produced by [`SharedRoot::resolve`], guaranteed to be under the root.
///
/// Deliberately not `Clone`: a resolved path is consumed by exactly one transfer.
#[derive(Debug)]
pub struct ResolvedPath {
    path: PathBuf,
    requested_name: Option<String>,
}

impl SharedRoot {
    /// Open an existing directory as a shared root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ShareError> {
        let path = path.as_ref();
        let canonical = std::fs::canonicalize(path).map_err(|e| {
            if is_missing(&e) {
                ShareError::NotFound(path.display().to_string())
            } else {
                ShareError::StorageUnavailable(e)
            }
        })?;

        if !canonical.is_dir() {
            return Err(ShareError::NotFound(format!(
                "{} is not a directory",
                canonical.display()
            )));
        }

        Ok(Self { path: canonical })
    }

    /// The canonical root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a percent-decoded client name to a path under this root.
    ///
    /// The empty name resolves to the root itself.
    pub async fn resolve(&self, raw_name: &str) -> Result<ResolvedPath, ShareError> {
        let relative = normalize(raw_name)?;
        let requested_name = relative
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        let joined = self.path.join(relative);
        let path = self.verify(joined, raw_name).await?;

        tracing::trace!(name = %raw_name, path = %path.display(), "Name resolved");
        Ok(ResolvedPath {
            path,
            requested_name,
        })
    }

    /// Canonicalize `joined` (or its deepest existing ancestor) and check containment.
    async fn verify(&self, joined: PathBuf, raw_name: &str) -> Result<PathBuf, ShareError> {
        let mut existing = joined.as_path();
        let mut missing: Vec<OsString> = Vec::new();

        let canonical = loop {
            match tokio::fs::canonicalize(existing).await {
                Ok(canonical) => break canonical,
                Err(e) if is_missing(&e) => {
                    if existing == self.path {
                        return Err(ShareError::StorageUnavailable(e));
                    }
                    // A dangling symlink could later be pointed anywhere.
                    if tokio::fs::symlink_metadata(existing).await.is_ok() {
                        return Err(escape(raw_name));
                    }
                    let (Some(name), Some(parent)) = (existing.file_name(), existing.parent())
                    else {
                        return Err(escape(raw_name));
                    };
                    missing.push(name.to_os_string());
                    existing = parent;
                }
                Err(e) => return Err(ShareError::StorageUnavailable(e)),
            }
        };

        if !canonical.starts_with(&self.path) {
            tracing::warn!(name = %raw_name, target = %canonical.display(), "Resolved path left the shared root");
            return Err(escape(raw_name));
        }

        let mut resolved = canonical;
        for name in missing.into_iter().rev() {
            resolved.push(name);
        }
        Ok(resolved)
    }
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Final segment of the name the client asked for.
    ///
    /// Differs from the canonical path's last segment when the name is a symlink.
    /// Falls back to the canonical path for the root itself.
    pub fn file_name(&self) -> Option<&str> {
        self.requested_name
            .as_deref()
            .or_else(|| self.path.file_name().and_then(|n| n.to_str()))
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

/// Reduce a client-declared upload file name to a bare file name.
///
/// Browsers on some platforms send a full local path; only the last segment is kept.
pub fn upload_file_name(raw: &str) -> Result<&str, ShareError> {
    let name = raw
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match name {
        "" | "." | ".." => Err(escape(raw)),
        n if n.contains('\0') => Err(escape(raw)),
        n => Ok(n),
    }
}

/// Lexical normalization. Fails on absolute names and on any leading `..`.
fn normalize(raw: &str) -> Result<PathBuf, ShareError> {
    if raw.contains('\0') || raw.starts_with(|c| c == '/' || c == '\\') {
        return Err(escape(raw));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(|c| c == '/' || c == '\\') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(escape(raw));
                }
            }
            s => {
                // Drive letters and similar prefixes do not parse as a single normal component.
                let mut components = Path::new(s).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => segments.push(s),
                    _ => return Err(escape(raw)),
                }
            }
        }
    }

    Ok(segments.iter().collect())
}

fn escape(raw: &str) -> ShareError {
    ShareError::PathEscape(raw.to_string())
}
