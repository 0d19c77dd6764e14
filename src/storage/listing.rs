//! Directory enumeration for the listing page.
//!
//! Only immediate children are read. Symlinks are not followed when
//! classifying entries, so a link is neither a file nor a directory here.

use std::path::Path;

use crate::error::ShareError;
use crate::storage::transfer::is_upload_temp_name;

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single child of the shared root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Immediate children of a directory, split by kind and sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// Read the immediate children of `root`.
pub async fn read_entries(root: &Path) -> Result<Vec<DirectoryEntry>, ShareError> {
    let mut reader = tokio::fs::read_dir(root).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let file_type = entry.file_type().await?;
        let kind = if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            continue;
        };

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::debug!(name = ?raw, "Skipping entry with non UTF-8 name");
                continue;
            }
        };

        if kind == EntryKind::File && is_upload_temp_name(&name) {
            continue;
        }

        entries.push(DirectoryEntry { name, kind });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// List `root`, returning sorted file and directory names.
pub async fn list(root: &Path) -> Result<Listing, ShareError> {
    let mut listing = Listing::default();
    for entry in read_entries(root).await? {
        match entry.kind {
            EntryKind::File => listing.files.push(entry.name),
            EntryKind::Directory => listing.dirs.push(entry.name),
        }
    }

    tracing::debug!(
        root = %root.display(),
        files = listing.files.len(),
        dirs = listing.dirs.len(),
        "Directory listed"
    );
    Ok(listing)
}
