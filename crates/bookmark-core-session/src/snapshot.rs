//! Persisted snapshot codec.
//!
//! The snapshot is a plain JSON object mapping absolute file paths to arrays
//! of `{ "line": int, "column": int, "label": string }` entries:
//!
//! ```json
//! {
//!   "/project/src/main.rs": [
//!     { "line": 12, "column": 0, "label": "entry point" }
//!   ]
//! }
//! ```
//!
//! The codec works on [`serde_json::Value`] directly so hydration can
//! validate shape per entry and keep whatever is usable: a malformed
//! bookmark (negative or non-integer `line`, wrong types, a duplicate line)
//! is discarded and counted, never aborting the rest of the load. A missing
//! `label` defaults to the empty string; a missing `column` defaults to 0.
//!
//! Serialization sorts files by path and bookmarks by line, so the written
//! document is reproducible for identical stores.

use crate::error::PersistError;
use bookmark_core::{Bookmark, BookmarkStore, Position};
use serde_json::{Map, Value, json};

/// Render a store as a snapshot document. Files without bookmarks are
/// omitted (an absent key means "no bookmarks for that file").
pub fn serialize_store(store: &BookmarkStore) -> Value {
    let mut sets: Vec<_> = store
        .files()
        .map(|(_, set)| set)
        .filter(|set| !set.is_empty())
        .collect();
    sets.sort_by(|a, b| a.path().cmp(b.path()));

    let mut root = Map::new();
    for set in sets {
        let entries: Vec<Value> = set
            .iter()
            .map(|b| {
                json!({
                    "line": b.line(),
                    "column": b.column(),
                    "label": b.label,
                })
            })
            .collect();
        root.insert(set.path().to_string(), Value::Array(entries));
    }
    Value::Object(root)
}

/// Rebuild a store from a snapshot document.
///
/// Returns the store together with the number of discarded entries. Only a
/// non-object root is a hard error ([`PersistError::Malformed`]); everything
/// below that recovers entry by entry.
pub fn deserialize_store(value: &Value) -> Result<(BookmarkStore, usize), PersistError> {
    let Some(root) = value.as_object() else {
        return Err(PersistError::Malformed(
            "top-level value must be an object".to_string(),
        ));
    };

    // Hydrate in sorted-path order so store iteration is deterministic
    // regardless of how the document was written.
    let mut paths: Vec<&String> = root.keys().collect();
    paths.sort();

    let mut store = BookmarkStore::new();
    let mut discarded = 0;

    for path in paths {
        let Some(entries) = root[path].as_array() else {
            log::warn!("discarding snapshot entry for {path:?}: value is not an array");
            discarded += 1;
            continue;
        };

        let Ok(id) = store.ensure_file(path) else {
            log::warn!("discarding snapshot entry for unusable path {path:?}");
            discarded += 1;
            continue;
        };
        let Some(set) = store.file_mut(id) else {
            continue;
        };

        for entry in entries {
            let Some(bookmark) = parse_bookmark(entry) else {
                log::warn!("discarding malformed bookmark in {path:?}: {entry}");
                discarded += 1;
                continue;
            };
            let line = bookmark.line();
            if set
                .add_labeled(bookmark.position, bookmark.label)
                .is_err()
            {
                log::warn!("discarding duplicate bookmark for {path:?} line {line}");
                discarded += 1;
            }
        }
    }

    Ok((store, discarded))
}

fn parse_bookmark(value: &Value) -> Option<Bookmark> {
    let obj = value.as_object()?;
    let line = usize::try_from(obj.get("line")?.as_u64()?).ok()?;
    let column = match obj.get("column") {
        None => 0,
        Some(v) => usize::try_from(v.as_u64()?).ok()?,
    };
    let label = match obj.get("label") {
        None => "",
        Some(v) => v.as_str()?,
    };
    Some(Bookmark::with_label(Position::new(line, column), label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_store() -> BookmarkStore {
        let mut store = BookmarkStore::new();
        let b = store.ensure_file("/w/b.rs").unwrap();
        let a = store.ensure_file("/w/a.rs").unwrap();
        store
            .file_mut(a)
            .unwrap()
            .add_labeled(Position::new(3, 1), "start")
            .unwrap();
        store.file_mut(b).unwrap().add(Position::new(0, 0)).unwrap();
        store.file_mut(b).unwrap().add(Position::new(9, 4)).unwrap();
        store
    }

    #[test]
    fn test_serialize_is_path_sorted() {
        let value = serialize_store(&sample_store());
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["/w/a.rs", "/w/b.rs"]);
    }

    #[test]
    fn test_round_trip_equivalence() {
        let original = sample_store();
        let value = serialize_store(&original);
        let (rebuilt, discarded) = deserialize_store(&value).unwrap();

        assert_eq!(discarded, 0);
        assert_eq!(serialize_store(&rebuilt), value);
        assert_eq!(
            rebuilt.total_bookmark_count(),
            original.total_bookmark_count()
        );
        let labels: Vec<String> = rebuilt
            .file_for_path("/w/a.rs")
            .unwrap()
            .iter()
            .map(|b| b.label.clone())
            .collect();
        assert_eq!(labels, vec!["start".to_string()]);
    }

    #[test]
    fn test_empty_sets_are_omitted() {
        let mut store = sample_store();
        store.ensure_file("/w/empty.rs").unwrap();
        let value = serialize_store(&store);
        assert!(value.get("/w/empty.rs").is_none());
    }

    #[test]
    fn test_negative_line_discarded_without_aborting() {
        let value = json!({
            "/w/a.rs": [
                { "line": -1, "column": 0, "label": "broken" },
                { "line": 2, "column": 0, "label": "fine" },
            ],
        });
        let (store, discarded) = deserialize_store(&value).unwrap();

        assert_eq!(discarded, 1);
        let set = store.file_for_path("/w/a.rs").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.bookmarks()[0].line(), 2);
    }

    #[test]
    fn test_missing_label_and_column_default() {
        let value = json!({ "/w/a.rs": [ { "line": 5 } ] });
        let (store, discarded) = deserialize_store(&value).unwrap();

        assert_eq!(discarded, 0);
        let bookmark = &store.file_for_path("/w/a.rs").unwrap().bookmarks()[0];
        assert_eq!(bookmark.position, Position::new(5, 0));
        assert!(!bookmark.is_labeled());
    }

    #[test]
    fn test_wrong_types_discarded() {
        let value = json!({
            "/w/a.rs": [
                { "line": "five" },
                { "line": 1.5 },
                42,
                { "line": 7, "column": -3 },
            ],
            "/w/b.rs": "not an array",
            "/w/c.rs": [ { "line": 0 } ],
        });
        let (store, discarded) = deserialize_store(&value).unwrap();

        assert_eq!(discarded, 5);
        assert!(store.file_for_path("/w/a.rs").unwrap().is_empty());
        assert_eq!(store.file_for_path("/w/c.rs").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_lines_keep_first() {
        let value = json!({
            "/w/a.rs": [
                { "line": 4, "label": "first" },
                { "line": 4, "label": "second" },
            ],
        });
        let (store, discarded) = deserialize_store(&value).unwrap();

        assert_eq!(discarded, 1);
        let set = store.file_for_path("/w/a.rs").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.bookmarks()[0].label, "first");
    }

    #[test]
    fn test_non_object_root_is_malformed() {
        assert!(deserialize_store(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_hydration_order_is_deterministic() {
        let value = json!({
            "/w/z.rs": [ { "line": 0 } ],
            "/w/a.rs": [ { "line": 0 } ],
        });
        let (store, _) = deserialize_store(&value).unwrap();
        let paths: Vec<&str> = store.files().map(|(_, set)| set.path()).collect();
        assert_eq!(paths, vec!["/w/a.rs", "/w/z.rs"]);
    }
}
