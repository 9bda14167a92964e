//! Offset index: bidirectional mapping between linear character offsets and line/character
//! positions for one document snapshot.
//!
//! The index is a flat table of line-start offsets built by a single scan of the content. Every
//! `'\n'` terminates a line; when the content does not end with a terminator, its length is
//! appended as a sentinel so the last line still has an end. Line count is therefore
//! `line_starts.len() - 1`, and empty content has zero lines.
//!
//! All queries are total: out-of-range lines, characters and offsets are clamped instead of
//! reported as errors, so slightly stale client coordinates still resolve to something sensible.

use crate::position::{Position, Range};
use ropey::Rope;

/// Line-start table for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetIndex {
    /// Start offset of every line, plus a final sentinel equal to the content length.
    line_starts: Vec<usize>,
    /// Terminator width (0, 1 or 2) of every line, `line_count()` entries.
    newline_lengths: Vec<u8>,
    /// Content length in characters.
    len: usize,
}

impl OffsetIndex {
    /// Build an index over a string.
    pub fn from_text(text: &str) -> Self {
        Self::from_chars(text.chars())
    }

    /// Build an index over a rope.
    pub fn from_rope(rope: &Rope) -> Self {
        Self::from_chars(rope.chars())
    }

    /// Build an index from a character stream.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut line_starts = vec![0];
        let mut newline_lengths = Vec::new();
        let mut prev = None;
        let mut len = 0;

        for (idx, ch) in chars.into_iter().enumerate() {
            if ch == '\n' {
                line_starts.push(idx + 1);
                newline_lengths.push(if prev == Some('\r') { 2 } else { 1 });
            }
            prev = Some(ch);
            len = idx + 1;
        }

        if line_starts.last() != Some(&len) {
            // No trailing terminator: the last line ends at end-of-content.
            line_starts.push(len);
            newline_lengths.push(0);
        }

        Self {
            line_starts,
            newline_lengths,
            len,
        }
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len() - 1
    }

    /// Content length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for empty content.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The raw line-start table, sentinel included.
    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    /// Offset of the first character of `line`. Lines past the end map to the content length.
    pub fn line_start_offset(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.len)
    }

    /// Offset just past the terminator of `line` (the next line's start). The last line ends at
    /// the content length.
    pub fn line_end_offset(&self, line: usize) -> usize {
        line.checked_add(1)
            .and_then(|next| self.line_starts.get(next))
            .copied()
            .unwrap_or(self.len)
    }

    /// Width of the terminator of `line`: 2 for `"\r\n"`, 1 for `"\n"`, 0 for an unterminated
    /// last line (and for lines past the end).
    pub fn newline_length(&self, line: usize) -> usize {
        self.newline_lengths.get(line).copied().unwrap_or(0) as usize
    }

    /// Length of `line` including its terminator.
    pub fn line_length_including_newline(&self, line: usize) -> usize {
        self.line_end_offset(line)
            .saturating_sub(self.line_start_offset(line))
    }

    /// Length of `line` excluding its terminator.
    pub fn line_length_excluding_newline(&self, line: usize) -> usize {
        self.line_length_including_newline(line)
            .saturating_sub(self.newline_length(line))
    }

    /// Convert a position to an offset.
    ///
    /// Lines past the end clamp to the content length; characters past the end of a line clamp
    /// to the line end (terminator included).
    pub fn offset(&self, position: Position) -> usize {
        let start = self.line_start_offset(position.line);
        start + position
            .character
            .min(self.line_length_including_newline(position.line))
    }

    /// Convert a position pair to an offset pair, without reordering.
    pub fn offsets(&self, range: &Range) -> (usize, usize) {
        (self.offset(range.start), self.offset(range.end))
    }

    /// Convert an offset to a position. Offsets past the end clamp to the content length.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line_count = self.line_count();
        if line_count == 0 {
            return Position::new(0, offset);
        }

        // Greatest real line whose start is <= offset; line_starts[0] == 0 keeps this >= 1.
        let line = self.line_starts[..line_count].partition_point(|&start| start <= offset) - 1;
        Position::new(line, offset - self.line_starts[line])
    }

    /// Convert an offset pair to a range.
    pub fn range(&self, start: usize, end: usize) -> Range {
        Range::new(self.position(start), self.position(end))
    }
}

impl Default for OffsetIndex {
    fn default() -> Self {
        Self::from_text("")
    }
}
