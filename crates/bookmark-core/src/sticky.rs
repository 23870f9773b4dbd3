//! Sticky bookmark adjustment.
//!
//! When the document changes, every bookmark of the affected file must be
//! repositioned so it keeps pointing at the same logical content, matching
//! common editor behavior:
//!
//! - content above an edit is untouched;
//! - content below an edit shifts by the edit's net line delta;
//! - a bookmark whose anchor line is removed outright is dropped, and that
//!   loss is reported to the caller instead of happening silently;
//! - edits on the bookmark's own line shift the column with a best-effort
//!   heuristic (see [`apply_change`]).
//!
//! The adjuster never fails on out-of-range input: everything it cannot keep
//! is reported through [`AdjustOutcome`]. Bookmarks that end up past the new
//! end of the document are reported in `out_of_range` but left in the set;
//! evicting (and logging) them is the caller's decision.
//!
//! Cost is linear in bookmarks × edits for the affected file; no other file
//! is touched and no document rescan happens.

use crate::delta::{ChangeEvent, TextEdit};
use crate::file_set::FileBookmarkSet;
use crate::position::{Bookmark, Position};

/// Result of applying one [`ChangeEvent`] to a file's bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjustOutcome {
    /// Bookmarks dropped because their anchor text no longer exists.
    pub removed: Vec<Bookmark>,
    /// Bookmarks now pointing past the new end of the document. They are
    /// still in the set; the caller removes and reports them.
    pub out_of_range: Vec<Bookmark>,
    /// Number of surviving bookmarks whose position changed.
    pub moved: usize,
}

impl AdjustOutcome {
    /// Returns `true` if nothing was removed, moved, or flagged.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.out_of_range.is_empty() && self.moved == 0
    }
}

/// How one edit affects one bookmark position.
enum Adjusted {
    Keep(Position),
    Drop,
}

struct Slot {
    bookmark: Bookmark,
    original: Position,
}

/// Recompute every bookmark of `set` for `change`.
///
/// Edits are composed earliest-in-document first; the replaced range of each
/// later edit is shifted by the cumulative line delta of the edits already
/// applied, so a single notification carrying several edits lands on the
/// same positions as the equivalent sequence of single-edit notifications.
///
/// Per edit, a bookmark is handled by the first matching rule:
///
/// 1. Above the replaced range: untouched.
/// 2. Anchor line removed — strictly inside a multi-line replaced range, or
///    on its first line when the range starts at column 0: dropped and
///    reported.
/// 3. On the single edited line: columns left of the replaced span are
///    untouched, columns at/right of it shift by the net length (following
///    inserted line breaks onto the tail line), columns inside it clamp to
///    the end of the inserted text. Best-effort, pinned by the unit tests.
/// 4. At or below the end of the replaced range: the line shifts by the
///    edit's line delta; when the range's end line was partially consumed,
///    the column is remapped onto the merged line.
pub fn apply_change(set: &mut FileBookmarkSet, change: &ChangeEvent) -> AdjustOutcome {
    let mut outcome = AdjustOutcome::default();
    if set.is_empty() || change.is_empty() {
        return outcome;
    }

    if change.wipes_document() {
        outcome.removed = set.bookmarks().to_vec();
        set.clear();
        return outcome;
    }

    // Fast path: a same-line-count event entirely above the first bookmark
    // cannot move anything.
    let first_line = set.bookmarks()[0].line();
    if change.line_delta() == 0 && change.edits.iter().all(|e| e.end.line < first_line) {
        return outcome;
    }

    let mut slots: Vec<Option<Slot>> = set
        .bookmarks()
        .iter()
        .cloned()
        .map(|bookmark| {
            let original = bookmark.position;
            Some(Slot { bookmark, original })
        })
        .collect();

    let mut line_shift: isize = 0;
    for edit in &change.edits {
        let start = Position::new(shift_line(edit.start.line, line_shift), edit.start.column);
        let end = Position::new(shift_line(edit.end.line, line_shift), edit.end.column);

        for slot in slots.iter_mut() {
            let Some(entry) = slot.as_mut() else { continue };
            match adjust_one(entry.bookmark.position, edit, start, end) {
                Adjusted::Keep(position) => entry.bookmark.position = position,
                Adjusted::Drop => {
                    if let Some(dropped) = slot.take() {
                        outcome.removed.push(dropped.bookmark);
                    }
                }
            }
        }

        line_shift += edit.line_delta();
    }

    let mut survivors: Vec<Slot> = slots.into_iter().flatten().collect();
    survivors.sort_by_key(|slot| slot.bookmark.position);

    // Edits can merge two anchor lines into one; the earliest bookmark wins
    // and the rest count as lost anchors.
    let mut kept: Vec<Bookmark> = Vec::with_capacity(survivors.len());
    for slot in survivors {
        if kept
            .last()
            .is_some_and(|prev| prev.line() == slot.bookmark.line())
        {
            outcome.removed.push(slot.bookmark);
            continue;
        }
        if slot.bookmark.position != slot.original {
            outcome.moved += 1;
        }
        kept.push(slot.bookmark);
    }

    outcome.out_of_range = kept
        .iter()
        .filter(|b| b.line() >= change.line_count_after)
        .cloned()
        .collect();

    set.replace_all(kept);
    outcome
}

fn shift_line(line: usize, delta: isize) -> usize {
    if delta >= 0 {
        line.saturating_add(delta as usize)
    } else {
        line.saturating_sub(delta.unsigned_abs())
    }
}

fn adjust_one(pos: Position, edit: &TextEdit, start: Position, end: Position) -> Adjusted {
    if pos.line < start.line {
        return Adjusted::Keep(pos);
    }

    let delta = edit.line_delta();
    let inserted_breaks = edit.inserted_line_breaks();

    if start.line == end.line {
        if pos.line > start.line {
            return Adjusted::Keep(Position::new(shift_line(pos.line, delta), pos.column));
        }
        // Same line as a single-line replaced span.
        if pos.column < start.column {
            return Adjusted::Keep(pos);
        }
        if pos.column >= end.column {
            let offset = pos.column - end.column;
            if inserted_breaks == 0 {
                return Adjusted::Keep(Position::new(
                    pos.line,
                    start.column + edit.inserted_len() + offset,
                ));
            }
            return Adjusted::Keep(Position::new(
                shift_line(pos.line, delta),
                edit.inserted_tail_len() + offset,
            ));
        }
        // Inside the replaced span: clamp to the end of the insertion.
        if inserted_breaks == 0 {
            return Adjusted::Keep(Position::new(pos.line, start.column + edit.inserted_len()));
        }
        return Adjusted::Keep(Position::new(
            shift_line(pos.line, delta),
            edit.inserted_tail_len(),
        ));
    }

    // Multi-line replaced range.
    if pos.line == start.line {
        if start.column == 0 {
            // The whole anchor line is consumed.
            return Adjusted::Drop;
        }
        if pos.column > start.column {
            return Adjusted::Keep(Position::new(pos.line, start.column));
        }
        return Adjusted::Keep(pos);
    }
    if pos.line < end.line {
        return Adjusted::Drop;
    }

    // pos.line >= end.line: shifted content. The end line merges into the
    // start line when it was partially consumed.
    let line = shift_line(pos.line, delta);
    if pos.line == end.line && end.column > 0 {
        let merge_base = if inserted_breaks == 0 {
            start.column
        } else {
            edit.inserted_tail_len()
        };
        let column = merge_base + pos.column.saturating_sub(end.column);
        return Adjusted::Keep(Position::new(line, column));
    }
    Adjusted::Keep(Position::new(line, pos.column))
}
