//! Edit vocabulary shared by incremental and full-text updates.
//!
//! Clients describe edits as [`ContentChange`]s (a range in pre-edit coordinates plus
//! replacement text). The document model reports every update, whatever its shape on the wire,
//! as a list of [`ChangeEvent`]s carrying both coordinate systems, so downstream consumers never
//! need to diff old and new text themselves.

use crate::position::Range;

/// One incremental edit as sent by a client.
///
/// `range` is interpreted against the document state *before* the batch it belongs to is
/// applied; edits in one batch do not see each other's results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    /// Replaced range (pre-edit coordinates).
    pub range: Range,
    /// Replacement text (may be empty, may contain newlines).
    pub text: String,
}

impl ContentChange {
    /// Create a content change.
    pub fn new(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// A normalized description of one edit, in both position and offset coordinates of the
/// pre-edit document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Replaced range.
    pub range: Range,
    /// Start offset of the replaced span.
    pub range_offset: usize,
    /// Length of the replaced span in characters.
    pub range_length: usize,
    /// Replacement text.
    pub text: String,
}

impl ChangeEvent {
    /// Exclusive end offset of the replaced span.
    pub fn range_end(&self) -> usize {
        self.range_offset + self.range_length
    }

    /// Re-express this event as a client-style edit.
    pub fn to_content_change(&self) -> ContentChange {
        ContentChange::new(self.range, self.text.clone())
    }
}
