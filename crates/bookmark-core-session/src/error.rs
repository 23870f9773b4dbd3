use bookmark_core::{FileSetError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by session commands and event handlers.
pub enum SessionError {
    #[error("unknown document: {0}")]
    /// The path was never registered with the session.
    UnknownFile(String),

    #[error("document not open: {0}")]
    /// The document has no mirror; the host never reported it as opened.
    DocumentNotOpen(String),

    #[error("no bookmark on line {line}")]
    /// A label edit referenced a line without a bookmark.
    NoBookmarkAtLine {
        /// The requested line.
        line: usize,
    },

    #[error(transparent)]
    /// A store-level failure (e.g. an unusable path).
    Store(#[from] StoreError),

    #[error(transparent)]
    /// A per-file collection failure (duplicate line, stale index).
    Set(#[from] FileSetError),
}

#[derive(Debug, Error)]
/// Errors produced by snapshot persistence.
pub enum PersistError {
    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("malformed persisted state: {0}")]
    /// The snapshot file exists but is not a usable JSON document.
    Malformed(String),
}
