//! Snapshot storage on disk.
//!
//! Bookmarks persist in one of two places, depending on configuration:
//!
//! - a shared state directory (one `bookmarks.json` for the installation),
//! - a project-relative dotfile (`.bookmarks.json` in the workspace root),
//!   suitable for checking in next to the code.
//!
//! Loading tolerates an absent file (a fresh store) and degrades per entry
//! on shape problems; only unreadable or unparsable JSON is surfaced as
//! [`PersistError::Malformed`], letting the caller fall back to an empty
//! store and tell the user.

use crate::error::PersistError;
use crate::snapshot;
use bookmark_core::BookmarkStore;
use serde_json::Value;
use std::io;
use std::path::PathBuf;

/// Snapshot file name inside a shared state directory.
pub const GLOBAL_SNAPSHOT_FILE: &str = "bookmarks.json";
/// Snapshot file name inside a workspace root.
pub const WORKSPACE_SNAPSHOT_FILE: &str = ".bookmarks.json";

/// Where the snapshot document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// A state directory shared across workspaces.
    Global(PathBuf),
    /// A single workspace root; the snapshot sits next to the project.
    Workspace(PathBuf),
}

impl StorageLocation {
    /// Full path of the snapshot document for this location.
    pub fn snapshot_path(&self) -> PathBuf {
        match self {
            StorageLocation::Global(dir) => dir.join(GLOBAL_SNAPSHOT_FILE),
            StorageLocation::Workspace(root) => root.join(WORKSPACE_SNAPSHOT_FILE),
        }
    }
}

/// A hydrated snapshot plus load diagnostics.
#[derive(Debug)]
pub struct LoadedSnapshot {
    /// The rebuilt store (empty when the file did not exist).
    pub store: BookmarkStore,
    /// Number of entries discarded during validation.
    pub discarded: usize,
}

/// Read and hydrate the snapshot at `location`.
pub fn load(location: &StorageLocation) -> Result<LoadedSnapshot, PersistError> {
    let path = location.snapshot_path();
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(LoadedSnapshot {
                store: BookmarkStore::new(),
                discarded: 0,
            });
        }
        Err(err) => return Err(PersistError::Io(err)),
    };

    let value: Value = serde_json::from_str(&text)
        .map_err(|err| PersistError::Malformed(format!("{}: {err}", path.display())))?;
    let (store, discarded) = snapshot::deserialize_store(&value)?;
    if discarded > 0 {
        log::warn!(
            "snapshot {}: discarded {discarded} invalid entr{}",
            path.display(),
            if discarded == 1 { "y" } else { "ies" }
        );
    }
    Ok(LoadedSnapshot { store, discarded })
}

/// Write the store's snapshot document at `location`, creating parent
/// directories as needed.
pub fn save(store: &BookmarkStore, location: &StorageLocation) -> Result<(), PersistError> {
    let path = location.snapshot_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let value = snapshot::serialize_store(store);
    let text = serde_json::to_string_pretty(&value)
        .map_err(|err| PersistError::Malformed(err.to_string()))?;
    std::fs::write(&path, text)?;
    log::debug!("snapshot written to {}", path.display());
    Ok(())
}
