//! The process-wide bookmark store.
//!
//! A [`BookmarkStore`] owns one [`FileBookmarkSet`] per known document,
//! keyed by normalized path. Files are assigned opaque, monotonically
//! increasing [`FileId`]s, so iterating the id map always yields insertion
//! order — the cross-file navigation order is deterministic by construction.
//!
//! The "active file" is a weak, non-owning handle: the store remembers the
//! path key only and re-resolves it against the path table on every access.
//! Removing the active file therefore makes the handle resolve to `None`
//! instead of leaving a stale reference behind.

use crate::file_set::FileBookmarkSet;
use std::collections::{BTreeMap, HashMap};

/// Opaque identifier for a file registered in a [`BookmarkStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u64);

impl FileId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Store-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The path was empty or otherwise unusable as a key.
    InvalidPath(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidPath(path) => write!(f, "Invalid file path: {:?}", path),
        }
    }
}

impl std::error::Error for StoreError {}

/// Validate a host-provided path, returning its display form.
pub fn normalize_path(path: &str) -> Result<&str, StoreError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(trimmed)
}

/// Lookup key for a path: case-folded on platforms whose default
/// filesystems compare case-insensitively.
fn path_key(path: &str) -> String {
    #[cfg(any(windows, target_os = "macos"))]
    {
        path.trim().to_lowercase()
    }
    #[cfg(not(any(windows, target_os = "macos")))]
    {
        path.trim().to_string()
    }
}

/// All bookmark state of one editing session.
#[derive(Debug, Default)]
pub struct BookmarkStore {
    next_file_id: u64,
    files: BTreeMap<FileId, FileBookmarkSet>,
    path_to_file: HashMap<String, FileId>,
    /// Path key of the focused file; resolved on every access.
    active: Option<String>,
}

impl BookmarkStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the set for `path`, registering an empty one if unknown.
    /// Idempotent: a path maps to the same id for the store's lifetime.
    pub fn ensure_file(&mut self, path: &str) -> Result<FileId, StoreError> {
        let path = normalize_path(path)?;
        let key = path_key(path);
        if let Some(id) = self.path_to_file.get(&key) {
            return Ok(*id);
        }

        let id = FileId(self.next_file_id);
        self.next_file_id = self.next_file_id.saturating_add(1);
        self.files.insert(id, FileBookmarkSet::new(path));
        self.path_to_file.insert(key, id);
        Ok(id)
    }

    /// Look up a file id by path.
    pub fn file_id_for_path(&self, path: &str) -> Option<FileId> {
        self.path_to_file.get(&path_key(path)).copied()
    }

    /// Get a file's bookmark set by id.
    pub fn file(&self, id: FileId) -> Option<&FileBookmarkSet> {
        self.files.get(&id)
    }

    /// Get a file's bookmark set mutably by id.
    pub fn file_mut(&mut self, id: FileId) -> Option<&mut FileBookmarkSet> {
        self.files.get_mut(&id)
    }

    /// Get a file's bookmark set by path.
    pub fn file_for_path(&self, path: &str) -> Option<&FileBookmarkSet> {
        self.file_id_for_path(path).and_then(|id| self.file(id))
    }

    /// Point the active handle at `path`. Unknown paths silently leave the
    /// handle unset; callers must cope with an absent active file.
    pub fn set_active(&mut self, path: &str) {
        let key = path_key(path);
        self.active = self.path_to_file.contains_key(&key).then_some(key);
    }

    /// Drop the active handle.
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Resolve the active handle to a file id.
    pub fn active_file_id(&self) -> Option<FileId> {
        self.active
            .as_ref()
            .and_then(|key| self.path_to_file.get(key))
            .copied()
    }

    /// Resolve the active handle to its bookmark set.
    pub fn active_file(&self) -> Option<&FileBookmarkSet> {
        self.active_file_id().and_then(|id| self.file(id))
    }

    /// Resolve the active handle to its bookmark set, mutably.
    pub fn active_file_mut(&mut self) -> Option<&mut FileBookmarkSet> {
        let id = self.active_file_id()?;
        self.file_mut(id)
    }

    /// Display path of the active file, if the handle resolves.
    pub fn active_path(&self) -> Option<&str> {
        self.active_file().map(|set| set.path())
    }

    /// Forget a file and its bookmarks. Returns `false` for unknown paths.
    pub fn remove_file(&mut self, path: &str) -> bool {
        let key = path_key(path);
        match self.path_to_file.remove(&key) {
            Some(id) => {
                self.files.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Forget every file and its bookmarks.
    pub fn remove_all_files(&mut self) {
        self.files.clear();
        self.path_to_file.clear();
    }

    /// Returns `true` if any registered file holds at least one bookmark.
    pub fn has_any_bookmark(&self) -> bool {
        self.files.values().any(|set| !set.is_empty())
    }

    /// Number of registered files (including empty sets).
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no file is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total bookmark count across all files.
    pub fn total_bookmark_count(&self) -> usize {
        self.files.values().map(|set| set.len()).sum()
    }

    /// Iterate all files in insertion order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileBookmarkSet)> {
        self.files.iter().map(|(id, set)| (*id, set))
    }

    /// Iterate all file ids in insertion order.
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn test_ensure_file_is_idempotent() {
        let mut store = BookmarkStore::new();
        let a = store.ensure_file("/src/a.rs").unwrap();
        let again = store.ensure_file("/src/a.rs").unwrap();
        assert_eq!(a, again);
        assert_eq!(store.file_count(), 1);
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let mut store = BookmarkStore::new();
        assert_eq!(
            store.ensure_file("   "),
            Err(StoreError::InvalidPath("   ".to_string()))
        );
    }

    #[test]
    fn test_insertion_order_iteration() {
        let mut store = BookmarkStore::new();
        store.ensure_file("/z.rs").unwrap();
        store.ensure_file("/a.rs").unwrap();
        store.ensure_file("/m.rs").unwrap();

        let paths: Vec<&str> = store.files().map(|(_, set)| set.path()).collect();
        assert_eq!(paths, vec!["/z.rs", "/a.rs", "/m.rs"]);
    }

    #[test]
    fn test_active_handle_resolves_lazily() {
        let mut store = BookmarkStore::new();
        store.ensure_file("/src/a.rs").unwrap();
        store.set_active("/src/a.rs");
        assert_eq!(store.active_path(), Some("/src/a.rs"));

        // Unknown path: the handle silently becomes unset.
        store.set_active("/src/unknown.rs");
        assert!(store.active_file().is_none());
    }

    #[test]
    fn test_active_handle_survives_no_stale_reference() {
        let mut store = BookmarkStore::new();
        let id = store.ensure_file("/src/a.rs").unwrap();
        store.file_mut(id).unwrap().add(Position::new(1, 0)).unwrap();
        store.set_active("/src/a.rs");

        // Removing the active file must not leave a dangling handle.
        assert!(store.remove_file("/src/a.rs"));
        assert!(store.active_file().is_none());
        assert!(store.active_file_id().is_none());

        // Re-registering the path re-resolves the same handle.
        store.ensure_file("/src/a.rs").unwrap();
        assert_eq!(store.active_path(), Some("/src/a.rs"));
    }

    #[test]
    fn test_remove_file_is_silent_for_unknown() {
        let mut store = BookmarkStore::new();
        assert!(!store.remove_file("/nope.rs"));
    }

    #[test]
    fn test_has_any_bookmark_ignores_empty_sets() {
        let mut store = BookmarkStore::new();
        let id = store.ensure_file("/src/a.rs").unwrap();
        assert!(!store.has_any_bookmark());

        store.file_mut(id).unwrap().add(Position::new(3, 0)).unwrap();
        assert!(store.has_any_bookmark());
        assert_eq!(store.total_bookmark_count(), 1);

        store.file_mut(id).unwrap().clear();
        assert!(!store.has_any_bookmark());
        assert_eq!(store.file_count(), 1);
    }

    #[test]
    fn test_remove_all_files() {
        let mut store = BookmarkStore::new();
        store.ensure_file("/a.rs").unwrap();
        store.ensure_file("/b.rs").unwrap();
        store.remove_all_files();
        assert!(store.is_empty());
        assert!(!store.has_any_bookmark());
    }

    #[cfg(any(windows, target_os = "macos"))]
    #[test]
    fn test_case_insensitive_lookup() {
        let mut store = BookmarkStore::new();
        let id = store.ensure_file("/Src/Main.rs").unwrap();
        assert_eq!(store.file_id_for_path("/src/main.rs"), Some(id));
        // Display form keeps the first spelling seen.
        assert_eq!(store.file(id).unwrap().path(), "/Src/Main.rs");
    }

    #[cfg(not(any(windows, target_os = "macos")))]
    #[test]
    fn test_case_sensitive_lookup() {
        let mut store = BookmarkStore::new();
        store.ensure_file("/Src/Main.rs").unwrap();
        assert_eq!(store.file_id_for_path("/src/main.rs"), None);
    }
}
