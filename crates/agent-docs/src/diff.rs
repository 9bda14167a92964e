//! Diff calculator: turns a full-text replacement into the incremental edit vocabulary.
//!
//! Clients that only send full snapshots still need to be described as a list of
//! [`ChangeEvent`]s for consumers that reason about "what changed". The edit script is a
//! character-level Myers diff between the document's current content and the new text; every
//! operation is expressed in the *old* document's coordinates, so the events can be fed straight
//! back into [`crate::patch::apply_content_changes`].

use crate::change::ChangeEvent;
use crate::document::Document;
use crate::offsets::OffsetIndex;
use similar::{Algorithm, DiffTag, TextDiff};

/// One `(start, end, replacement)` operation against the old text, in character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEdit {
    /// Start offset in the old text.
    pub start: usize,
    /// Exclusive end offset in the old text.
    pub end: usize,
    /// Replacement text.
    pub text: String,
}

/// Compute the edit script transforming `old` into `new`. Edits are ordered by start offset and
/// do not overlap.
pub fn diff_edits(old: &str, new: &str) -> Vec<DiffEdit> {
    if old == new {
        return Vec::new();
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_chars(old, new);
    let new_slices = diff.new_slices();

    diff.ops()
        .iter()
        .filter_map(|op| {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            (tag != DiffTag::Equal).then(|| DiffEdit {
                start: old_range.start,
                end: old_range.end,
                text: new_slices[new_range].concat(),
            })
        })
        .collect()
}

/// Change events describing a full-text update of one document.
///
/// The script is computed once on construction; iterating it maps operations to events on the fly
/// and can be repeated with identical results.
#[derive(Debug, Clone)]
pub struct ContentDiff<'a> {
    index: &'a OffsetIndex,
    edits: Vec<DiffEdit>,
}

impl<'a> ContentDiff<'a> {
    /// Diff `document`'s current content against `new_text`.
    pub fn compute(document: &'a Document, new_text: &str) -> Self {
        Self {
            index: document.offset_index(),
            edits: diff_edits(&document.get_text(None), new_text),
        }
    }

    /// The raw edit script.
    pub fn edits(&self) -> &[DiffEdit] {
        &self.edits
    }

    /// Returns `true` if old and new text are identical.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of change events.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Iterate change events.
    pub fn iter(&self) -> impl Iterator<Item = ChangeEvent> + '_ {
        self.edits.iter().map(|edit| ChangeEvent {
            range: self.index.range(edit.start, edit.end),
            range_offset: edit.start,
            range_length: edit.end - edit.start,
            text: edit.text.clone(),
        })
    }
}

impl<'d, 'a> IntoIterator for &'d ContentDiff<'a> {
    type Item = ChangeEvent;
    type IntoIter = Box<dyn Iterator<Item = ChangeEvent> + 'd>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ContentChange;
    use crate::patch::apply_content_changes;
    use crate::position::Range;
    use pretty_assertions::assert_eq;

    fn round_trip(old: &str, new: &str) -> String {
        let document = Document::from_text("file:///d.txt", old);
        let diff = ContentDiff::compute(&document, new);
        let changes: Vec<ContentChange> = diff.iter().map(|e| e.to_content_change()).collect();
        apply_content_changes(&document, &changes).unwrap().text
    }

    #[test]
    fn test_identical_text_has_no_events() {
        let document = Document::from_text("file:///d.txt", "same\n");
        let diff = ContentDiff::compute(&document, "same\n");
        assert!(diff.is_empty());
        assert_eq!(diff.iter().count(), 0);
    }

    #[test]
    fn test_single_insertion() {
        let document = Document::from_text("file:///d.txt", "hello world");
        let diff = ContentDiff::compute(&document, "hello brave world");
        let events: Vec<ChangeEvent> = diff.iter().collect();
        assert_eq!(
            events,
            vec![ChangeEvent {
                range: Range::from_coords(0, 6, 0, 6),
                range_offset: 6,
                range_length: 0,
                text: "brave ".to_string(),
            }]
        );
    }

    #[test]
    fn test_events_use_old_coordinates() {
        let document = Document::from_text("file:///d.txt", "a\nb\nc\n");
        let diff = ContentDiff::compute(&document, "a\nc\n");
        let events: Vec<ChangeEvent> = diff.iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].range_length, 2);
        assert_eq!(events[0].text, "");
        assert_eq!(round_trip("a\nb\nc\n", "a\nc\n"), "a\nc\n");
    }

    #[test]
    fn test_iteration_is_repeatable() {
        let document = Document::from_text("file:///d.txt", "abcdef");
        let diff = ContentDiff::compute(&document, "abXdYf");
        let first: Vec<ChangeEvent> = (&diff).into_iter().collect();
        let second: Vec<ChangeEvent> = diff.iter().collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_round_trip_through_patch_applier() {
        let cases = [
            ("", "new content"),
            ("old content", ""),
            ("fn a() {}\n", "fn b() {\n    todo!()\n}\n"),
            ("a\r\nb\r\n", "a\nb\n"),
            ("😀 emoji ✓", "✓ emoji 😀!"),
            ("line 1\nline 2\nline 3", "line 0\nline 2\nline 3\nline 4"),
        ];
        for (old, new) in cases {
            assert_eq!(round_trip(old, new), new, "old={old:?}");
        }
    }
}
