#![warn(missing_docs)]
//! Host editor integration for `bookmark-core`.
//!
//! This crate is the layer a host editor wires its commands and events
//! into. The kernel (`bookmark-core`) knows nothing about files on disk,
//! pickers, or command palettes; this crate adds:
//!
//! - the [`Session`] type: document lifecycle events, user commands
//!   (toggle / label / clear / list / jump), and the gutter feed
//! - snapshot persistence: a JSON document in a shared state directory or
//!   a project-relative dotfile, hydrated at startup with per-entry
//!   validation and written back behind a short debounce
//!
//! The API intentionally uses `serde_json::Value` for the snapshot codec
//! instead of derived types: hydration must tolerate half-broken documents
//! entry by entry, which is a parsing policy, not a type mapping.
//!
//! # Quick Start
//!
//! ```rust
//! use bookmark_core::{Direction, Position};
//! use bookmark_core_session::{Session, SessionConfig, StorageLocation, Toggle};
//!
//! let dir = std::env::temp_dir().join("bookmark-session-doc");
//! let config = SessionConfig::new(StorageLocation::Workspace(dir));
//! let (mut session, _report) = Session::open(config);
//!
//! session.document_opened("/src/main.rs", "fn main() {\n    run();\n}\n").unwrap();
//! let toggled = session.toggle("/src/main.rs", Position::new(1, 4)).unwrap();
//! assert!(matches!(toggled, Toggle::Added(_)));
//!
//! let jump = session.jump("/src/main.rs", Position::new(0, 0), Direction::Forward);
//! assert!(matches!(jump, bookmark_core::Jump::WithinFile(_)));
//! ```

pub mod error;
pub mod persist;
pub mod session;
pub mod snapshot;

pub use error::{PersistError, SessionError};
pub use persist::{LoadedSnapshot, StorageLocation, load, save};
pub use session::{
    ChangeOutcome, ListEntry, LoadReport, RangeChange, Session, SessionConfig, Toggle,
};
pub use snapshot::{deserialize_store, serialize_store};
