//! Rope-backed mirror of an open document.
//!
//! The kernel never owns document text — the host does. But turning the
//! host's "replaced range + new text" notifications into full [`TextEdit`]s
//! (including the deleted text) and validating bookmark positions both need
//! line-level access to the content as it was at notification time. A
//! [`DocumentMirror`] keeps that content in a [`ropey::Rope`] for O(log n)
//! line access and is updated in lock-step with the host's edits.

use crate::delta::TextEdit;
use crate::position::Position;
use ropey::Rope;

/// Line-indexed copy of one open document.
#[derive(Debug, Clone)]
pub struct DocumentMirror {
    rope: Rope,
}

impl DocumentMirror {
    /// Build a mirror from the document's current text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Total line count (an empty document has one line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the document holds no text at all.
    pub fn is_blank(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// The complete document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text of the given line without its trailing line break.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
        Some(text)
    }

    /// Character length of the given line, excluding its line break.
    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let start = self.rope.line_to_char(line);
        if line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(line + 1) - start - 1
        } else {
            self.rope.len_chars() - start
        }
    }

    /// Convert a line/column position to a character offset, clamping the
    /// column to the line length and the line to the document end.
    pub fn position_to_char(&self, position: Position) -> usize {
        if position.line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let start = self.rope.line_to_char(position.line);
        start + position.column.min(self.line_len_chars(position.line))
    }

    /// Convert a character offset to a line/column position.
    pub fn char_to_position(&self, char_offset: usize) -> Position {
        let char_offset = char_offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_offset);
        let column = char_offset - self.rope.line_to_char(line);
        Position::new(line, column)
    }

    /// Clamp a position onto actual document content.
    pub fn clamp(&self, position: Position) -> Position {
        self.char_to_position(self.position_to_char(position))
    }

    /// Apply one host edit to the mirror and return the full record of it,
    /// including the text it deleted.
    ///
    /// `start`/`end` are in the mirror's current (pre-edit) coordinates and
    /// are clamped onto content; a reversed range is reordered.
    pub fn apply_edit(&mut self, start: Position, end: Position, new_text: &str) -> TextEdit {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        let start = self.clamp(start);
        let end = self.clamp(end);

        let start_char = self.position_to_char(start);
        let end_char = self.position_to_char(end);
        let deleted = self.rope.slice(start_char..end_char).to_string();

        self.rope.remove(start_char..end_char);
        self.rope.insert(start_char, new_text);

        TextEdit::replace(start, end, deleted, new_text)
    }

    /// Replace the whole mirrored content (full-document sync).
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }
}
