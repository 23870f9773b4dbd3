#![warn(missing_docs)]
//! Bookmark Core - Headless Bookmark Tracking Kernel
//!
//! # Overview
//!
//! `bookmark-core` is a headless kernel for line bookmarks in text documents.
//! It does not render anything and never touches document text on its own —
//! the host editor owns the text, the cursor, and the gutter; this crate owns
//! the bookmark state and keeps it correct while the text changes underneath.
//!
//! # Core Features
//!
//! - **Per-file collections**: one ordered bookmark set per document, with
//!   binary-search lookup and a one-bookmark-per-line invariant
//! - **Sticky adjustment**: bookmarks follow their content through inserts,
//!   deletes, and replacements; anchor loss is reported, never silent
//! - **Deterministic cross-file order**: files navigate in insertion order,
//!   so "next file with bookmarks" is stable across sessions
//! - **Sentinel navigation**: "no more bookmarks" is a value, not an error
//! - **Document mirror**: a rope-backed copy of open documents that turns
//!   host edit notifications into structured change deltas
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Navigator (within-file + cross-file ring)  │  ← Navigation
//! ├─────────────────────────────────────────────┤
//! │  BookmarkStore (path-keyed, active handle)  │  ← Session State
//! ├─────────────────────────────────────────────┤
//! │  Sticky Adjuster (change event application) │  ← Tracking
//! ├─────────────────────────────────────────────┤
//! │  FileBookmarkSet (sorted per-file entries)  │  ← Collections
//! ├─────────────────────────────────────────────┤
//! │  Position / Bookmark / TextEdit             │  ← Value Types
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Tracking bookmarks through an edit
//!
//! ```rust
//! use bookmark_core::{ChangeEvent, FileBookmarkSet, Position, TextEdit, sticky};
//!
//! let mut set = FileBookmarkSet::new("/notes.md");
//! set.add(Position::new(4, 0)).unwrap();
//!
//! // Two lines inserted at the top of a 20-line document.
//! let event = ChangeEvent::new(20, 22, vec![TextEdit::insert(Position::new(0, 0), "\n\n")]);
//! let outcome = sticky::apply_change(&mut set, &event);
//!
//! assert_eq!(set.bookmarks()[0].line(), 6);
//! assert!(outcome.removed.is_empty());
//! ```
//!
//! ## Navigating
//!
//! ```rust
//! use bookmark_core::{BookmarkStore, Direction, Navigator, NextBookmark, Position};
//!
//! let mut store = BookmarkStore::new();
//! let file = store.ensure_file("/src/main.rs").unwrap();
//! store.file_mut(file).unwrap().add(Position::new(10, 2)).unwrap();
//!
//! let nav = Navigator::new(&store);
//! let next = nav.next_within_file(file, Position::new(0, 0), Direction::Forward);
//! assert_eq!(next, NextBookmark::Found(bookmark_core::Bookmark::new(Position::new(10, 2))));
//! ```
//!
//! # Module Description
//!
//! - [`position`] - bookmark value types and ordering
//! - [`file_set`] - per-file ordered collections
//! - [`delta`] - structured change deltas in line/column coordinates
//! - [`sticky`] - position adjustment under text changes
//! - [`document`] - rope-backed mirror of open documents
//! - [`store`] - the path-keyed, process-wide store
//! - [`navigate`] - within-file and cross-file navigation

pub mod delta;
pub mod document;
pub mod file_set;
pub mod navigate;
pub mod position;
pub mod sticky;
pub mod store;

pub use delta::{ChangeEvent, TextEdit};
pub use document::DocumentMirror;
pub use file_set::{FileBookmarkSet, FileSetError};
pub use navigate::{Direction, Jump, Navigator, NextBookmark, NextFile};
pub use position::{Bookmark, Position};
pub use sticky::{AdjustOutcome, apply_change};
pub use store::{BookmarkStore, FileId, StoreError, normalize_path};
