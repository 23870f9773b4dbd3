//! The editing-session layer.
//!
//! A [`Session`] wraps the tracking kernel for a host editor: it hydrates
//! the store at startup, turns host events (document opened / closed /
//! focused / changed) into kernel operations, exposes the user-facing
//! commands (toggle, label, clear, list, jump), and coalesces snapshot
//! writes behind a short debounce.
//!
//! Everything runs synchronously on the host's single control thread. Each
//! entry point completes before the next event is handled, so a change
//! notification is fully folded into bookmark state before any command can
//! read it, and no locking exists anywhere in the layer. Persistence is
//! decoupled from mutation: commands only stamp the store dirty, and the
//! host drains the dirt via [`Session::flush_due`] / [`Session::flush`]
//! from its idle loop, plus a mandatory [`Session::shutdown`] at teardown.

use crate::error::{PersistError, SessionError};
use crate::persist::{self, StorageLocation};
use bookmark_core::sticky::apply_change;
use bookmark_core::{
    Bookmark, BookmarkStore, ChangeEvent, Direction, DocumentMirror, FileId, Jump, Navigator,
    NextBookmark, Position,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Maximum characters of line text carried into a picker entry.
const PREVIEW_MAX_CHARS: usize = 120;

/// Session construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Where the snapshot document lives.
    pub location: StorageLocation,
    /// How long the store may stay dirty before a flush is due.
    pub flush_debounce: Duration,
}

impl SessionConfig {
    /// Config with the default write debounce.
    pub fn new(location: StorageLocation) -> Self {
        Self {
            location,
            flush_debounce: Duration::from_millis(500),
        }
    }
}

/// One replaced range of a host change notification, in pre-event
/// line/column coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeChange {
    /// Inclusive start of the replaced range.
    pub start: Position,
    /// Exclusive end of the replaced range.
    pub end: Position,
    /// The replacement text (empty for deletions).
    pub text: String,
}

impl RangeChange {
    /// Convenience constructor.
    pub fn new(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// What a change notification did to the file's bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeOutcome {
    /// Bookmarks lost to the edit (anchor deleted or pushed out of range).
    pub removed: Vec<Bookmark>,
    /// Number of bookmarks that moved.
    pub moved: usize,
    /// The file's marked lines after adjustment (gutter refresh feed).
    pub marked_lines: Vec<usize>,
}

/// Outcome of a toggle command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// A bookmark was created.
    Added(Bookmark),
    /// The line's bookmark was removed.
    Removed(Bookmark),
    /// The line's bookmark got a new label.
    Relabeled(Bookmark),
}

/// One row for the host's searchable bookmark picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Display path of the bookmark's file.
    pub path: String,
    /// The bookmark itself.
    pub bookmark: Bookmark,
    /// Text of the marked line when the document is open, else empty.
    pub preview: String,
}

/// Diagnostics from session startup.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// `true` when a snapshot document was found and hydrated.
    pub hydrated: bool,
    /// Entries discarded during validation.
    pub discarded: usize,
    /// Present when the snapshot could not be used at all; the session
    /// started empty instead.
    pub error: Option<PersistError>,
}

/// Bookmark state and behavior of one editing session.
pub struct Session {
    store: BookmarkStore,
    mirrors: HashMap<FileId, DocumentMirror>,
    config: SessionConfig,
    dirty_since: Option<Instant>,
}

impl Session {
    /// Start a session, hydrating the store from the configured location.
    ///
    /// A missing snapshot is a normal first run. An unusable snapshot is
    /// reported through the [`LoadReport`] and the session starts empty.
    pub fn open(config: SessionConfig) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let store = match persist::load(&config.location) {
            Ok(loaded) => {
                report.hydrated = !loaded.store.is_empty();
                report.discarded = loaded.discarded;
                loaded.store
            }
            Err(err) => {
                log::warn!("could not load bookmarks, starting empty: {err}");
                report.error = Some(err);
                BookmarkStore::new()
            }
        };

        let session = Self {
            store,
            mirrors: HashMap::new(),
            config,
            dirty_since: None,
        };
        (session, report)
    }

    /// Start a session from an existing store, skipping hydration.
    pub fn with_store(store: BookmarkStore, config: SessionConfig) -> Self {
        Self {
            store,
            mirrors: HashMap::new(),
            config,
            dirty_since: None,
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &BookmarkStore {
        &self.store
    }

    /// Returns `true` if any file holds at least one bookmark.
    pub fn has_any_bookmark(&self) -> bool {
        self.store.has_any_bookmark()
    }

    // ---- host events -----------------------------------------------------

    /// A document became available: register it and mirror its text.
    ///
    /// Hydrated bookmarks pointing past the end of the actual document are
    /// evicted here, so stale snapshot entries never survive into an open
    /// file.
    pub fn document_opened(&mut self, path: &str, text: &str) -> Result<FileId, SessionError> {
        let id = self.store.ensure_file(path)?;
        let mirror = DocumentMirror::new(text);
        let line_count = mirror.line_count();
        self.mirrors.insert(id, mirror);

        let mut evicted = 0;
        if let Some(set) = self.store.file_mut(id) {
            let stale: Vec<usize> = set
                .marked_lines()
                .filter(|&line| line >= line_count)
                .collect();
            for line in stale {
                set.remove_at_line(line);
                evicted += 1;
            }
        }
        if evicted > 0 {
            log::info!("{path}: dropped {evicted} bookmark(s) beyond the end of the document");
            self.mark_dirty();
        }

        log::debug!("document opened: {path} ({line_count} lines)");
        Ok(id)
    }

    /// A document went away; its bookmarks stay, its mirror does not.
    pub fn document_closed(&mut self, path: &str) {
        if let Some(id) = self.store.file_id_for_path(path) {
            self.mirrors.remove(&id);
        }
    }

    /// The focused document changed; re-resolve the active handle.
    pub fn active_document_changed(&mut self, path: Option<&str>) {
        match path {
            Some(path) => self.store.set_active(path),
            None => self.store.clear_active(),
        }
    }

    /// The host reported a text change. Folds the edits into the mirror,
    /// adjusts the file's bookmarks, and evicts whatever ended up past the
    /// new end of the document.
    pub fn document_changed(
        &mut self,
        path: &str,
        changes: &[RangeChange],
    ) -> Result<ChangeOutcome, SessionError> {
        let id = self
            .store
            .file_id_for_path(path)
            .ok_or_else(|| SessionError::UnknownFile(path.to_string()))?;
        let Some(mirror) = self.mirrors.get_mut(&id) else {
            return Err(SessionError::DocumentNotOpen(path.to_string()));
        };

        let line_count_before = mirror.line_count();

        // Apply to the mirror back-to-front so every change's pre-event
        // coordinates stay valid while its deleted text is captured.
        let mut ordered: Vec<&RangeChange> = changes.iter().collect();
        ordered.sort_by_key(|change| std::cmp::Reverse(change.start.min(change.end)));
        let mut edits = Vec::with_capacity(ordered.len());
        for change in ordered {
            edits.push(mirror.apply_edit(change.start, change.end, &change.text));
        }
        let event = ChangeEvent::new(line_count_before, mirror.line_count(), edits);

        let outcome = {
            let Some(set) = self.store.file_mut(id) else {
                return Err(SessionError::UnknownFile(path.to_string()));
            };
            let adjust = apply_change(set, &event);

            let mut removed = adjust.removed;
            for stale in adjust.out_of_range {
                if let Some(bookmark) = set.remove_at_line(stale.line()) {
                    removed.push(bookmark);
                }
            }

            ChangeOutcome {
                removed,
                moved: adjust.moved,
                marked_lines: set.marked_lines().collect(),
            }
        };

        if !outcome.removed.is_empty() {
            log::info!(
                "{path}: {} bookmark(s) lost to an edit",
                outcome.removed.len()
            );
        }
        if !outcome.removed.is_empty() || outcome.moved > 0 {
            self.mark_dirty();
        }
        Ok(outcome)
    }

    // ---- commands --------------------------------------------------------

    /// Toggle a plain bookmark at the cursor position.
    pub fn toggle(&mut self, path: &str, position: Position) -> Result<Toggle, SessionError> {
        let id = self.store.ensure_file(path)?;
        let Some(set) = self.store.file_mut(id) else {
            return Err(SessionError::UnknownFile(path.to_string()));
        };

        let result = match set.remove_at_line(position.line) {
            Some(removed) => Toggle::Removed(removed),
            None => {
                set.add(position)?;
                Toggle::Added(Bookmark::new(position))
            }
        };

        match &result {
            Toggle::Added(b) => log::info!("{path}: bookmark added at line {}", b.line()),
            Toggle::Removed(b) => log::info!("{path}: bookmark removed from line {}", b.line()),
            Toggle::Relabeled(_) => {}
        }
        self.mark_dirty();
        Ok(result)
    }

    /// Toggle a labeled bookmark at the cursor position.
    ///
    /// An existing bookmark on the line is relabeled when the label
    /// differs, and removed when it is toggled with its own label again.
    pub fn toggle_labeled(
        &mut self,
        path: &str,
        position: Position,
        label: &str,
    ) -> Result<Toggle, SessionError> {
        let id = self.store.ensure_file(path)?;
        let Some(set) = self.store.file_mut(id) else {
            return Err(SessionError::UnknownFile(path.to_string()));
        };

        let result = match set.index_of_line(position.line) {
            Some(index) => {
                let existing = set.remove(index)?;
                if existing.label == label {
                    Toggle::Removed(existing)
                } else {
                    set.add_labeled(existing.position, label)?;
                    Toggle::Relabeled(Bookmark::with_label(existing.position, label))
                }
            }
            None => {
                set.add_labeled(position, label)?;
                Toggle::Added(Bookmark::with_label(position, label))
            }
        };

        log::info!("{path}: labeled toggle at line {}", position.line);
        self.mark_dirty();
        Ok(result)
    }

    /// Change the label of the bookmark on `line`.
    pub fn edit_label(&mut self, path: &str, line: usize, label: &str) -> Result<(), SessionError> {
        let id = self
            .store
            .file_id_for_path(path)
            .ok_or_else(|| SessionError::UnknownFile(path.to_string()))?;
        let Some(set) = self.store.file_mut(id) else {
            return Err(SessionError::UnknownFile(path.to_string()));
        };
        let index = set
            .index_of_line(line)
            .ok_or(SessionError::NoBookmarkAtLine { line })?;
        set.set_label(index, label)?;
        self.mark_dirty();
        Ok(())
    }

    /// Drop every bookmark of one file; the file stays registered.
    /// Returns the number of bookmarks removed (0 for unknown files).
    pub fn clear_file(&mut self, path: &str) -> usize {
        let Some(id) = self.store.file_id_for_path(path) else {
            return 0;
        };
        let Some(set) = self.store.file_mut(id) else {
            return 0;
        };
        let count = set.len();
        set.clear();
        if count > 0 {
            log::info!("{path}: cleared {count} bookmark(s)");
            self.mark_dirty();
        }
        count
    }

    /// Drop every bookmark of every file. Returns the number removed.
    pub fn clear_all(&mut self) -> usize {
        let count = self.store.total_bookmark_count();
        let ids: Vec<FileId> = self.store.file_ids().collect();
        for id in ids {
            if let Some(set) = self.store.file_mut(id) {
                set.clear();
            }
        }
        if count > 0 {
            log::info!("cleared {count} bookmark(s) across all files");
            self.mark_dirty();
        }
        count
    }

    /// Picker rows for one file's bookmarks.
    pub fn list_file(&self, path: &str) -> Result<Vec<ListEntry>, SessionError> {
        let id = self
            .store
            .file_id_for_path(path)
            .ok_or_else(|| SessionError::UnknownFile(path.to_string()))?;
        let Some(set) = self.store.file(id) else {
            return Err(SessionError::UnknownFile(path.to_string()));
        };
        Ok(set
            .iter()
            .map(|bookmark| self.entry(id, set.path(), bookmark))
            .collect())
    }

    /// Picker rows for every bookmark of every file, in file insertion
    /// order and line order within each file.
    pub fn list_all(&self) -> Vec<ListEntry> {
        self.store
            .files()
            .flat_map(|(id, set)| {
                set.iter()
                    .map(move |bookmark| self.entry(id, set.path(), bookmark))
            })
            .collect()
    }

    fn entry(&self, id: FileId, path: &str, bookmark: &Bookmark) -> ListEntry {
        let preview = self
            .mirrors
            .get(&id)
            .and_then(|mirror| mirror.line_text(bookmark.line()))
            .map(|line| truncate_chars(&line, PREVIEW_MAX_CHARS))
            .unwrap_or_default();
        ListEntry {
            path: path.to_string(),
            bookmark: bookmark.clone(),
            preview,
        }
    }

    /// Two-level jump from a cursor position: within the file first, then
    /// across files in store order.
    pub fn jump(&self, path: &str, from: Position, direction: Direction) -> Jump {
        let id = self.store.file_id_for_path(path);
        Navigator::new(&self.store).jump(id, from, direction)
    }

    /// Within-file navigation only.
    pub fn next_in_file(&self, path: &str, from: Position, direction: Direction) -> NextBookmark {
        match self.store.file_id_for_path(path) {
            Some(id) => Navigator::new(&self.store).next_within_file(id, from, direction),
            None => NextBookmark::NoBookmarks,
        }
    }

    /// The file's marked lines (gutter decoration feed).
    pub fn marked_lines(&self, path: &str) -> Vec<usize> {
        self.store
            .file_for_path(path)
            .map(|set| set.marked_lines().collect())
            .unwrap_or_default()
    }

    // ---- persistence lifecycle -------------------------------------------

    fn mark_dirty(&mut self) {
        if self.dirty_since.is_none() {
            self.dirty_since = Some(Instant::now());
        }
    }

    /// Returns `true` when there are unflushed mutations.
    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Returns `true` when the debounce window of the oldest unflushed
    /// mutation has elapsed at `now`.
    pub fn flush_due(&self, now: Instant) -> bool {
        self.dirty_since
            .is_some_and(|since| now.duration_since(since) >= self.config.flush_debounce)
    }

    /// Write the snapshot if dirty. Returns `true` when a write happened.
    pub fn flush(&mut self) -> Result<bool, PersistError> {
        if self.dirty_since.is_none() {
            return Ok(false);
        }
        persist::save(&self.store, &self.config.location)?;
        self.dirty_since = None;
        Ok(true)
    }

    /// Final flush before the session is torn down.
    pub fn shutdown(&mut self) -> Result<(), PersistError> {
        self.flush()?;
        Ok(())
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
