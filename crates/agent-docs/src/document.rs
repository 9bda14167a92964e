//! Documents: one resource's current text, its offset index, and positional metadata.
//!
//! A [`Document`] is mutated in place by [`Document::update`], which is the only path through
//! which its state changes. Shared ownership goes through [`DocumentRef`]: every holder of a
//! clone observes the latest update, and only the registry can mutate through it.

use crate::error::SyncError;
use crate::line_ending::LineEnding;
use crate::offsets::OffsetIndex;
use crate::position::{Position, Range};
use crate::uri::{canonical_uri, file_name, split_scheme};
use ropey::Rope;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// The full state of a resource at one instant, as resolved from an update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Resource identifier the snapshot claims to describe.
    pub uri: String,
    /// Full text content.
    pub content: String,
    /// Last known selection.
    pub selection: Option<Range>,
    /// Last known visible range.
    pub visible_range: Option<Range>,
}

impl Snapshot {
    /// Snapshot with content only.
    pub fn new(uri: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            content: content.into(),
            selection: None,
            visible_range: None,
        }
    }
}

/// One line of a document, as returned by [`Document::line_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// 0-based line number.
    pub line_number: usize,
    /// Line text without its terminator.
    pub text: String,
    /// Range of `text`.
    pub range: Range,
    /// Range of the line including its terminator.
    ///
    /// The end is the position of the offset just past the terminator. Positions never name
    /// the empty line after a trailing newline, so for the last line of `"abc\n"` this is
    /// `0:4`, not `1:0`.
    pub range_including_line_break: Range,
    /// Index of the first non-whitespace character (`text` length for blank lines).
    pub first_non_whitespace_character_index: usize,
}

impl TextLine {
    /// Returns `true` if the line contains only whitespace.
    pub fn is_empty_or_whitespace(&self) -> bool {
        self.first_non_whitespace_character_index == self.text.chars().count()
    }
}

/// Mutable, identity-stable model of one resource.
pub struct Document {
    uri: String,
    text: Rope,
    index: OffsetIndex,
    version: u64,
    language_id: String,
    line_ending: LineEnding,
    selection: Option<Range>,
    visible_range: Option<Range>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("uri", &self.uri)
            .field("version", &self.version)
            .field("language_id", &self.language_id)
            .field("char_count", &self.index.len())
            .field("line_count", &self.index.line_count())
            .field("selection", &self.selection)
            .field("visible_range", &self.visible_range)
            .finish()
    }
}

fn heal_identifier(declared: &str, snapshot: &mut Snapshot) {
    if canonical_uri(&snapshot.uri) != canonical_uri(declared) {
        tracing::warn!(
            declared,
            snapshot = snapshot.uri.as_str(),
            "snapshot identifier does not match its document; forcing it to match"
        );
        snapshot.uri = declared.to_string();
    }
}

impl Document {
    /// Create a document for `uri` from `snapshot`.
    ///
    /// If the snapshot names a different resource, the mismatch is logged and the snapshot is
    /// re-labelled with `uri`.
    pub fn new(uri: impl Into<String>, mut snapshot: Snapshot) -> Self {
        let uri = uri.into();
        heal_identifier(&uri, &mut snapshot);

        let text = Rope::from_str(&snapshot.content);
        let index = OffsetIndex::from_text(&snapshot.content);
        let language_id = agent_docs_lang::language_for_file_name(&file_name(&uri));
        Self {
            line_ending: LineEnding::detect_in_text(&snapshot.content),
            uri,
            text,
            index,
            version: 0,
            language_id,
            selection: snapshot.selection,
            visible_range: snapshot.visible_range,
        }
    }

    /// Create a document with content only.
    pub fn from_text(uri: impl Into<String>, text: &str) -> Self {
        let uri = uri.into();
        let snapshot = Snapshot::new(uri.clone(), text);
        Self::new(uri, snapshot)
    }

    /// Replace the stored snapshot.
    ///
    /// The offset index is rebuilt only when the content differs; the version counter is bumped
    /// on every call. Returns `true` if the content changed.
    pub fn update(&mut self, mut snapshot: Snapshot) -> bool {
        heal_identifier(&self.uri, &mut snapshot);

        let changed = self.text != snapshot.content.as_str();
        if changed {
            self.text = Rope::from_str(&snapshot.content);
            self.index = OffsetIndex::from_text(&snapshot.content);
            self.line_ending = LineEnding::detect_in_text(&snapshot.content);
        }
        self.selection = snapshot.selection;
        self.visible_range = snapshot.visible_range;
        self.version += 1;
        changed
    }

    /// Resource identifier.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Last path segment of the identifier.
    pub fn file_name(&self) -> String {
        file_name(&self.uri)
    }

    /// Returns `true` for `untitled:` buffers that have no backing file.
    pub fn is_untitled(&self) -> bool {
        split_scheme(&self.uri).is_some_and(|(scheme, _)| scheme.eq_ignore_ascii_case("untitled"))
    }

    /// Content-type classification derived from the file name.
    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    /// Number of updates applied since creation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Dominant line ending of the current content.
    pub fn eol(&self) -> LineEnding {
        self.line_ending
    }

    /// Last known selection.
    pub fn selection(&self) -> Option<Range> {
        self.selection
    }

    /// Last known visible range.
    pub fn visible_range(&self) -> Option<Range> {
        self.visible_range
    }

    /// Number of lines (see [`OffsetIndex::line_count`]).
    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }

    /// Content length in characters.
    pub fn char_count(&self) -> usize {
        self.index.len()
    }

    /// The current offset index.
    pub fn offset_index(&self) -> &OffsetIndex {
        &self.index
    }

    /// The current content as a rope.
    pub fn rope(&self) -> &Rope {
        &self.text
    }

    /// Full content, or the text inside `range`.
    ///
    /// A range whose start resolves after its end yields an empty string.
    pub fn get_text(&self, range: Option<Range>) -> String {
        let Some(range) = range else {
            return self.text.to_string();
        };
        let (start, end) = self.index.offsets(&range);
        if start > end {
            return String::new();
        }
        self.text.slice(start..end).to_string()
    }

    /// Convert an offset to a position.
    pub fn position_at(&self, offset: usize) -> Position {
        self.index.position(offset)
    }

    /// Convert a position to an offset.
    pub fn offset_at(&self, position: Position) -> usize {
        self.index.offset(position)
    }

    /// Describe a line. Out-of-range line numbers clamp to the last line.
    pub fn line_at(&self, line: usize) -> TextLine {
        let line = line.min(self.line_count().saturating_sub(1));
        let start = self.index.line_start_offset(line);
        let len = self.index.line_length_excluding_newline(line);
        let text = self.text.slice(start..start + len).to_string();
        let first_non_whitespace_character_index = text
            .chars()
            .position(|ch| !ch.is_whitespace())
            .unwrap_or(len);
        let end_including = self.index.line_end_offset(line);

        TextLine {
            line_number: line,
            range: Range::new(Position::new(line, 0), Position::new(line, len)),
            range_including_line_break: Range::new(
                Position::new(line, 0),
                self.index.position(end_including),
            ),
            text,
            first_non_whitespace_character_index,
        }
    }

    /// Describe the line containing `position`.
    pub fn line_at_position(&self, position: Position) -> TextLine {
        self.line_at(position.line)
    }

    /// Word lookup needs editor word-pattern semantics this core does not model.
    pub fn word_range_at_position(&self, _position: Position) -> Result<Range, SyncError> {
        Err(SyncError::Unsupported("word_range_at_position"))
    }

    /// Range validation against editor semantics is not modelled; positions are clamped instead.
    pub fn validate_range(&self, _range: Range) -> Result<Range, SyncError> {
        Err(SyncError::Unsupported("validate_range"))
    }

    /// See [`Document::validate_range`].
    pub fn validate_position(&self, _position: Position) -> Result<Position, SyncError> {
        Err(SyncError::Unsupported("validate_position"))
    }

    /// Current state as a snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            uri: self.uri.clone(),
            content: self.text.to_string(),
            selection: self.selection,
            visible_range: self.visible_range,
        }
    }
}

/// Shared handle to a [`Document`].
///
/// Clones point at the same document. Reads always see the latest update; mutation is reserved
/// to the registry that created the handle.
#[derive(Clone)]
pub struct DocumentRef(Rc<RefCell<Document>>);

impl DocumentRef {
    pub(crate) fn new(document: Document) -> Self {
        Self(Rc::new(RefCell::new(document)))
    }

    pub(crate) fn update(&self, snapshot: Snapshot) -> Result<bool, SyncError> {
        let mut document = self
            .0
            .try_borrow_mut()
            .map_err(|_| SyncError::DocumentInUse(snapshot.uri.clone()))?;
        Ok(document.update(snapshot))
    }

    /// Borrow the document for reading.
    ///
    /// Release the guard before handing the next update to the registry; an update arriving
    /// while it is held fails with [`SyncError::DocumentInUse`].
    pub fn read(&self) -> Ref<'_, Document> {
        self.0.borrow()
    }

    /// Resource identifier.
    pub fn uri(&self) -> String {
        self.read().uri().to_string()
    }

    /// Full content.
    pub fn text(&self) -> String {
        self.read().get_text(None)
    }

    /// Current version counter.
    pub fn version(&self) -> u64 {
        self.read().version()
    }

    /// Returns `true` if both handles point at the same document.
    pub fn ptr_eq(&self, other: &DocumentRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(document) => f.debug_tuple("DocumentRef").field(&*document).finish(),
            Err(_) => f.write_str("DocumentRef(<updating>)"),
        }
    }
}
