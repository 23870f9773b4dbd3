//! Bookmark navigation.
//!
//! Navigation runs over two axes: the position order inside one file, and
//! the store's insertion order across files (treated as a ring). Exhaustion
//! is an expected, common outcome, so it is modeled as sentinel values —
//! never as errors.
//!
//! The two-level "jump" first looks within the starting file; only when
//! that direction is exhausted does it consult the cross-file ring, landing
//! on the first (forward) or last (backward) bookmark of the target file.

use crate::position::{Bookmark, Position};
use crate::store::{BookmarkStore, FileId};

/// Direction of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the file / later files.
    Forward,
    /// Toward the start of the file / earlier files.
    Backward,
}

/// Outcome of a within-file navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextBookmark {
    /// The next bookmark in the requested direction.
    Found(Bookmark),
    /// No bookmark lies after the given position.
    NoBookmarksAfter,
    /// No bookmark lies before the given position.
    NoBookmarksBefore,
    /// The file holds no bookmarks at all (or is unknown).
    NoBookmarks,
}

/// Outcome of a cross-file navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextFile {
    /// The next file holding at least one bookmark.
    Found(FileId),
    /// No other file qualifies.
    NoMoreBookmarks,
}

/// Outcome of a two-level jump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jump {
    /// The target is in the starting file.
    WithinFile(Bookmark),
    /// The target is in another file.
    AcrossFiles {
        /// The file to focus.
        file: FileId,
        /// The bookmark to land on.
        bookmark: Bookmark,
    },
    /// Navigation is exhausted in the requested direction.
    NoMoreBookmarks,
}

/// Read-only navigation over a [`BookmarkStore`].
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    store: &'a BookmarkStore,
}

impl<'a> Navigator<'a> {
    /// Create a navigator over the store's current state.
    pub fn new(store: &'a BookmarkStore) -> Self {
        Self { store }
    }

    /// Find the first bookmark strictly after (forward) or strictly before
    /// (backward) `from` inside `file`, in position order.
    pub fn next_within_file(
        &self,
        file: FileId,
        from: Position,
        direction: Direction,
    ) -> NextBookmark {
        let Some(set) = self.store.file(file) else {
            return NextBookmark::NoBookmarks;
        };
        if set.is_empty() {
            return NextBookmark::NoBookmarks;
        }

        let marks = set.bookmarks();
        match direction {
            Direction::Forward => {
                let idx = marks.partition_point(|b| b.position <= from);
                match marks.get(idx) {
                    Some(bookmark) => NextBookmark::Found(bookmark.clone()),
                    None => NextBookmark::NoBookmarksAfter,
                }
            }
            Direction::Backward => {
                let idx = marks.partition_point(|b| b.position < from);
                match idx.checked_sub(1).and_then(|i| marks.get(i)) {
                    Some(bookmark) => NextBookmark::Found(bookmark.clone()),
                    None => NextBookmark::NoBookmarksBefore,
                }
            }
        }
    }

    /// Walk the insertion-order ring of files starting just after (forward)
    /// or just before (backward) `from`, skipping files without bookmarks
    /// and `from` itself. A full wrap without a hit is exhaustion — even
    /// when `from` is the only file holding bookmarks.
    ///
    /// With `from = None` the scan starts at the ring's boundary instead,
    /// considering every file.
    pub fn next_file_with_bookmarks(
        &self,
        from: Option<FileId>,
        direction: Direction,
    ) -> NextFile {
        let ids: Vec<FileId> = self.store.file_ids().collect();
        if ids.is_empty() {
            return NextFile::NoMoreBookmarks;
        }

        let anchor = match from {
            Some(id) => ids.binary_search(&id),
            None => Err(0),
        };
        let candidates: Vec<FileId> = match (anchor, direction) {
            (Ok(i), Direction::Forward) => {
                ids[i + 1..].iter().chain(&ids[..i]).copied().collect()
            }
            (Ok(i), Direction::Backward) => ids[..i]
                .iter()
                .rev()
                .chain(ids[i + 1..].iter().rev())
                .copied()
                .collect(),
            (Err(i), Direction::Forward) => {
                ids[i..].iter().chain(&ids[..i]).copied().collect()
            }
            (Err(i), Direction::Backward) => ids[..i]
                .iter()
                .rev()
                .chain(ids[i..].iter().rev())
                .copied()
                .collect(),
        };

        candidates
            .into_iter()
            .find(|id| self.store.file(*id).is_some_and(|set| !set.is_empty()))
            .map_or(NextFile::NoMoreBookmarks, NextFile::Found)
    }

    /// First bookmark of a file, in position order.
    pub fn first_bookmark(&self, file: FileId) -> Option<Bookmark> {
        self.store.file(file)?.bookmarks().first().cloned()
    }

    /// Last bookmark of a file, in position order.
    pub fn last_bookmark(&self, file: FileId) -> Option<Bookmark> {
        self.store.file(file)?.bookmarks().last().cloned()
    }

    /// Two-level jump: within-file first, then across files.
    ///
    /// `file = None` means the starting document is unknown to the store;
    /// the jump then goes straight to the cross-file ring.
    pub fn jump(&self, file: Option<FileId>, from: Position, direction: Direction) -> Jump {
        if let Some(file) = file
            && let NextBookmark::Found(bookmark) = self.next_within_file(file, from, direction)
        {
            return Jump::WithinFile(bookmark);
        }

        match self.next_file_with_bookmarks(file, direction) {
            NextFile::Found(target) => {
                let bookmark = match direction {
                    Direction::Forward => self.first_bookmark(target),
                    Direction::Backward => self.last_bookmark(target),
                };
                match bookmark {
                    Some(bookmark) => Jump::AcrossFiles {
                        file: target,
                        bookmark,
                    },
                    None => Jump::NoMoreBookmarks,
                }
            }
            NextFile::NoMoreBookmarks => Jump::NoMoreBookmarks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_file(lines: &[(usize, usize)]) -> (BookmarkStore, FileId) {
        let mut store = BookmarkStore::new();
        let id = store.ensure_file("/src/main.rs").unwrap();
        let set = store.file_mut(id).unwrap();
        for &(line, column) in lines {
            set.add(Position::new(line, column)).unwrap();
        }
        (store, id)
    }

    #[test]
    fn test_forward_and_backward_within_file() {
        // Bookmarks at lines 2, 5, 9; cursor sitting on the line-5 mark.
        let (store, id) = store_with_file(&[(2, 0), (5, 3), (9, 0)]);
        let nav = Navigator::new(&store);

        let from = Position::new(5, 3);
        assert_eq!(
            nav.next_within_file(id, from, Direction::Forward),
            NextBookmark::Found(Bookmark::new(Position::new(9, 0)))
        );
        assert_eq!(
            nav.next_within_file(id, from, Direction::Backward),
            NextBookmark::Found(Bookmark::new(Position::new(2, 0)))
        );
    }

    #[test]
    fn test_within_file_sentinels() {
        let (store, id) = store_with_file(&[(2, 0), (5, 0)]);
        let nav = Navigator::new(&store);

        assert_eq!(
            nav.next_within_file(id, Position::new(9, 0), Direction::Forward),
            NextBookmark::NoBookmarksAfter
        );
        assert_eq!(
            nav.next_within_file(id, Position::new(0, 0), Direction::Backward),
            NextBookmark::NoBookmarksBefore
        );
    }

    #[test]
    fn test_empty_file_sentinel() {
        let (store, id) = store_with_file(&[]);
        let nav = Navigator::new(&store);
        assert_eq!(
            nav.next_within_file(id, Position::new(0, 0), Direction::Forward),
            NextBookmark::NoBookmarks
        );
    }

    #[test]
    fn test_same_line_column_ordering() {
        let (store, id) = store_with_file(&[(5, 4)]);
        let nav = Navigator::new(&store);

        // Cursor left of the bookmark on the same line still reaches it.
        assert_eq!(
            nav.next_within_file(id, Position::new(5, 1), Direction::Forward),
            NextBookmark::Found(Bookmark::new(Position::new(5, 4)))
        );
        // Cursor exactly on it does not ("strictly after").
        assert_eq!(
            nav.next_within_file(id, Position::new(5, 4), Direction::Forward),
            NextBookmark::NoBookmarksAfter
        );
    }

    fn ring_store() -> (BookmarkStore, FileId, FileId, FileId) {
        let mut store = BookmarkStore::new();
        let a = store.ensure_file("/a.rs").unwrap();
        let b = store.ensure_file("/b.rs").unwrap();
        let c = store.ensure_file("/c.rs").unwrap();
        for id in [a, b, c] {
            store.file_mut(id).unwrap().add(Position::new(0, 0)).unwrap();
        }
        (store, a, b, c)
    }

    #[test]
    fn test_file_ring_forward_and_wrap() {
        let (store, a, b, c) = ring_store();
        let nav = Navigator::new(&store);

        assert_eq!(
            nav.next_file_with_bookmarks(Some(b), Direction::Forward),
            NextFile::Found(c)
        );
        assert_eq!(
            nav.next_file_with_bookmarks(Some(c), Direction::Forward),
            NextFile::Found(a)
        );
        assert_eq!(
            nav.next_file_with_bookmarks(Some(a), Direction::Backward),
            NextFile::Found(c)
        );
    }

    #[test]
    fn test_file_ring_skips_empty_sets() {
        let (mut store, a, b, c) = ring_store();
        store.file_mut(c).unwrap().clear();
        let nav = Navigator::new(&store);

        assert_eq!(
            nav.next_file_with_bookmarks(Some(b), Direction::Forward),
            NextFile::Found(a)
        );
    }

    #[test]
    fn test_sole_bookmarked_file_is_exhaustion() {
        let (mut store, a, b, c) = ring_store();
        store.file_mut(a).unwrap().clear();
        store.file_mut(c).unwrap().clear();
        let nav = Navigator::new(&store);

        assert_eq!(
            nav.next_file_with_bookmarks(Some(b), Direction::Forward),
            NextFile::NoMoreBookmarks
        );
    }

    #[test]
    fn test_ring_from_unknown_anchor_scans_everything() {
        let (store, a, _b, c) = ring_store();
        let nav = Navigator::new(&store);

        assert_eq!(
            nav.next_file_with_bookmarks(None, Direction::Forward),
            NextFile::Found(a)
        );
        assert_eq!(
            nav.next_file_with_bookmarks(None, Direction::Backward),
            NextFile::Found(c)
        );
    }

    #[test]
    fn test_two_level_jump() {
        let mut store = BookmarkStore::new();
        let a = store.ensure_file("/a.rs").unwrap();
        let b = store.ensure_file("/b.rs").unwrap();
        store.file_mut(a).unwrap().add(Position::new(3, 0)).unwrap();
        store.file_mut(b).unwrap().add(Position::new(1, 0)).unwrap();
        store.file_mut(b).unwrap().add(Position::new(8, 0)).unwrap();
        let nav = Navigator::new(&store);

        // Still room within the file.
        assert_eq!(
            nav.jump(Some(b), Position::new(0, 0), Direction::Forward),
            Jump::WithinFile(Bookmark::new(Position::new(1, 0)))
        );

        // Past the last bookmark: land on the other file's first one.
        assert_eq!(
            nav.jump(Some(b), Position::new(9, 0), Direction::Forward),
            Jump::AcrossFiles {
                file: a,
                bookmark: Bookmark::new(Position::new(3, 0)),
            }
        );

        // Backward out of the file: land on the other file's last one.
        assert_eq!(
            nav.jump(Some(a), Position::new(0, 0), Direction::Backward),
            Jump::AcrossFiles {
                file: b,
                bookmark: Bookmark::new(Position::new(8, 0)),
            }
        );
    }

    #[test]
    fn test_jump_exhaustion() {
        let mut store = BookmarkStore::new();
        let b = store.ensure_file("/b.rs").unwrap();
        store.file_mut(b).unwrap().add(Position::new(1, 0)).unwrap();
        let nav = Navigator::new(&store);

        assert_eq!(
            nav.jump(Some(b), Position::new(5, 0), Direction::Forward),
            Jump::NoMoreBookmarks
        );
    }
}
