//! Patch applier: applies a batch of incremental edits to a document snapshot.
//!
//! Every edit's range is resolved against the *pre-edit* snapshot before anything is applied,
//! so a batch is order-independent in pre-edit coordinates. Overlapping spans within a
//! batch are rejected; zero-width inserts at the same offset are not overlaps and land in input
//! order.

use crate::change::{ChangeEvent, ContentChange};
use crate::document::Document;
use crate::error::SyncError;
use crate::offsets::OffsetIndex;

/// Result of applying a batch of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// Full text after the batch.
    pub text: String,
    /// One event per input edit, in input order, in pre-edit coordinates.
    ///
    /// Each `range` is the edit's range after clamping to the document and ordering its
    /// endpoints, so it always agrees with `range_offset` and `range_length`.
    pub changes: Vec<ChangeEvent>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedEdit<'a> {
    order: usize,
    start: usize,
    end: usize,
    text: &'a str,
}

fn resolve<'a>(index: &OffsetIndex, changes: &'a [ContentChange]) -> Vec<ResolvedEdit<'a>> {
    changes
        .iter()
        .enumerate()
        .map(|(order, change)| {
            let (a, b) = index.offsets(&change.range);
            ResolvedEdit {
                order,
                start: a.min(b),
                end: a.max(b),
                text: change.text.as_str(),
            }
        })
        .collect()
}

/// Apply `changes` to `document` without mutating it.
pub fn apply_content_changes(
    document: &Document,
    changes: &[ContentChange],
) -> Result<PatchOutcome, SyncError> {
    let index = document.offset_index();
    let mut resolved = resolve(index, changes);

    let events = resolved
        .iter()
        .map(|edit| ChangeEvent {
            range: index.range(edit.start, edit.end),
            range_offset: edit.start,
            range_length: edit.end - edit.start,
            text: edit.text.to_string(),
        })
        .collect::<Vec<_>>();

    // Stable: zero-width edits sort ahead of spans sharing their start, equal edits keep input
    // order.
    resolved.sort_by_key(|edit| (edit.start, edit.end));
    for pair in resolved.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        if second.start < first.end {
            return Err(SyncError::OverlappingEdits {
                first: changes[first.order].range,
                second: changes[second.order].range,
            });
        }
    }

    // Apply back to front so earlier offsets stay valid.
    let mut rope = document.rope().clone();
    for edit in resolved.iter().rev() {
        if edit.start < edit.end {
            rope.remove(edit.start..edit.end);
        }
        if !edit.text.is_empty() {
            rope.insert(edit.start, edit.text);
        }
    }

    Ok(PatchOutcome {
        text: rope.to_string(),
        changes: events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Range;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_text("file:///t.txt", text)
    }

    #[test]
    fn test_independent_single_character_replacements() {
        let document = doc("abc\ndef\nghi");
        let changes = vec![
            ContentChange::new(Range::from_coords(0, 0, 0, 1), "x"),
            ContentChange::new(Range::from_coords(1, 1, 1, 2), "y"),
            ContentChange::new(Range::from_coords(2, 1, 2, 2), "z"),
        ];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "xbc\ndyf\nghz");
    }

    #[test]
    fn test_edits_use_pre_edit_coordinates_regardless_of_order() {
        let document = doc("one two three");
        let changes = vec![
            ContentChange::new(Range::from_coords(0, 8, 0, 13), "3"),
            ContentChange::new(Range::from_coords(0, 0, 0, 3), "1"),
        ];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "1 two 3");
    }

    #[test]
    fn test_change_events_follow_input_order() {
        let document = doc("ab\ncd");
        let changes = vec![
            ContentChange::new(Range::from_coords(1, 0, 1, 2), "XY"),
            ContentChange::new(Range::from_coords(0, 1, 1, 0), ""),
        ];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "aXY");
        assert_eq!(
            outcome.changes,
            vec![
                ChangeEvent {
                    range: Range::from_coords(1, 0, 1, 2),
                    range_offset: 3,
                    range_length: 2,
                    text: "XY".to_string(),
                },
                ChangeEvent {
                    range: Range::from_coords(0, 1, 1, 0),
                    range_offset: 1,
                    range_length: 2,
                    text: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_out_of_range_coordinates_are_clamped() {
        let document = doc("ab\ncd");
        let changes = vec![ContentChange::new(Range::from_coords(1, 50, 9, 9), "!")];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "ab\ncd!");
        assert_eq!(outcome.changes[0].range, Range::from_coords(1, 2, 1, 2));
        assert_eq!(outcome.changes[0].range_offset, 5);
    }

    #[test]
    fn test_reversed_range_is_normalized() {
        let document = doc("hello");
        let changes = vec![ContentChange::new(Range::from_coords(0, 4, 0, 1), "")];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "ho");
        assert_eq!(outcome.changes[0].range, Range::from_coords(0, 1, 0, 4));
    }

    #[test]
    fn test_inserts_at_same_offset_keep_input_order() {
        let document = doc("ac");
        let changes = vec![
            ContentChange::new(Range::from_coords(0, 1, 0, 1), "b"),
            ContentChange::new(Range::from_coords(0, 1, 0, 1), "B"),
        ];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "abBc");
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let document = doc("abcdef");
        let changes = vec![
            ContentChange::new(Range::from_coords(0, 0, 0, 3), "x"),
            ContentChange::new(Range::from_coords(0, 2, 0, 4), "y"),
        ];
        let err = apply_content_changes(&document, &changes).unwrap_err();
        assert_eq!(
            err,
            SyncError::OverlappingEdits {
                first: Range::from_coords(0, 0, 0, 3),
                second: Range::from_coords(0, 2, 0, 4),
            }
        );
    }

    #[test]
    fn test_insert_at_start_of_deletion_is_order_independent() {
        let document = doc("abcd");
        let insert = ContentChange::new(Range::from_coords(0, 0, 0, 0), "X");
        let delete = ContentChange::new(Range::from_coords(0, 0, 0, 2), "");

        let forward = apply_content_changes(&document, &[insert.clone(), delete.clone()]).unwrap();
        let backward = apply_content_changes(&document, &[delete, insert]).unwrap();
        assert_eq!(forward.text, "Xcd");
        assert_eq!(backward.text, "Xcd");
        assert_eq!(backward.changes[0].range_length, 2);
        assert_eq!(backward.changes[1].range_length, 0);
    }

    #[test]
    fn test_spans_sharing_a_start_overlap() {
        let document = doc("abcd");
        let changes = vec![
            ContentChange::new(Range::from_coords(0, 0, 0, 3), ""),
            ContentChange::new(Range::from_coords(0, 0, 0, 1), "x"),
        ];
        let err = apply_content_changes(&document, &changes).unwrap_err();
        assert_eq!(
            err,
            SyncError::OverlappingEdits {
                first: Range::from_coords(0, 0, 0, 1),
                second: Range::from_coords(0, 0, 0, 3),
            }
        );
    }

    #[test]
    fn test_adjacent_edits_are_not_overlaps() {
        let document = doc("abcd");
        let changes = vec![
            ContentChange::new(Range::from_coords(0, 2, 0, 4), "CD"),
            ContentChange::new(Range::from_coords(0, 0, 0, 2), "AB"),
        ];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "ABCD");
    }

    #[test]
    fn test_crlf_content() {
        let document = doc("a\r\nb\r\n");
        let changes = vec![ContentChange::new(Range::from_coords(1, 0, 1, 1), "B")];
        let outcome = apply_content_changes(&document, &changes).unwrap();
        assert_eq!(outcome.text, "a\r\nB\r\n");
        assert_eq!(outcome.changes[0].range_offset, 3);
    }
}
