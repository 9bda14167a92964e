//! Editor surface: the view of a document that the rest of the agent reads selections from and
//! pushes programmatic edits through.
//!
//! A [`TextEditor`] never applies edits locally. [`TextEditor::edit`] records them into an
//! [`EditRequest`] that the transport forwards to the remote client; the resulting content comes
//! back as an ordinary update.

use crate::document::DocumentRef;
use crate::line_ending::LineEnding;
use crate::position::{Position, Range};

/// A single programmatic edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEdit {
    /// Replace `range` with `value`.
    Replace {
        /// Replaced range.
        range: Range,
        /// Replacement text.
        value: String,
    },
    /// Insert `value` at `position`.
    Insert {
        /// Insertion point.
        position: Position,
        /// Inserted text.
        value: String,
    },
    /// Delete `range`.
    Delete {
        /// Deleted range.
        range: Range,
    },
}

/// Collects edits inside [`TextEditor::edit`].
#[derive(Debug, Default)]
pub struct EditBuilder {
    edits: Vec<TextEdit>,
}

impl EditBuilder {
    /// Replace `range` with `value`.
    pub fn replace(&mut self, range: Range, value: impl Into<String>) -> &mut Self {
        self.edits.push(TextEdit::Replace {
            range,
            value: value.into(),
        });
        self
    }

    /// Insert `value` at `position`.
    pub fn insert(&mut self, position: Position, value: impl Into<String>) -> &mut Self {
        self.edits.push(TextEdit::Insert {
            position,
            value: value.into(),
        });
        self
    }

    /// Delete `range`.
    pub fn delete(&mut self, range: Range) -> &mut Self {
        self.edits.push(TextEdit::Delete { range });
        self
    }
}

/// Edits to forward to the client, tagged with the document version they were built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// Target resource.
    pub uri: String,
    /// Document version observed when the edits were recorded.
    pub version: u64,
    /// Recorded edits, in call order.
    pub edits: Vec<TextEdit>,
}

impl TextEdit {
    fn with_line_ending(self, eol: LineEnding) -> Self {
        match self {
            Self::Replace { range, value } => Self::Replace {
                range,
                value: eol.apply_to_text(&value),
            },
            Self::Insert { position, value } => Self::Insert {
                position,
                value: eol.apply_to_text(&value),
            },
            delete @ Self::Delete { .. } => delete,
        }
    }
}

impl EditRequest {
    /// Returns `true` if no edits were recorded.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Editor-surface wrapper around one document.
#[derive(Debug, Clone)]
pub struct TextEditor {
    document: DocumentRef,
}

impl TextEditor {
    /// Wrap a document.
    pub fn new(document: DocumentRef) -> Self {
        Self { document }
    }

    /// The wrapped document.
    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    /// Primary selection. Documents without a known selection report an empty range at `0:0`.
    pub fn selection(&self) -> Range {
        self.document.read().selection().unwrap_or_default()
    }

    /// All selections (the protocol carries only the primary one).
    pub fn selections(&self) -> Vec<Range> {
        vec![self.selection()]
    }

    /// Visible ranges, empty when the client has not reported one.
    pub fn visible_ranges(&self) -> Vec<Range> {
        self.document.read().visible_range().into_iter().collect()
    }

    /// Text inside the primary selection.
    pub fn selected_text(&self) -> String {
        let selection = self.selection();
        self.document.read().get_text(Some(selection))
    }

    /// Record edits for the client.
    ///
    /// Line breaks in inserted text are rewritten to the document's line ending.
    pub fn edit(&self, build: impl FnOnce(&mut EditBuilder)) -> EditRequest {
        let mut builder = EditBuilder::default();
        build(&mut builder);
        let document = self.document.read();
        let eol = document.eol();
        EditRequest {
            uri: document.uri().to_string(),
            version: document.version(),
            edits: builder
                .edits
                .into_iter()
                .map(|edit| edit.with_line_ending(eol))
                .collect(),
        }
    }
}
