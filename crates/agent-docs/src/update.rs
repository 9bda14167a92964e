//! Update messages: the decoded form of a client's request to change a document.

use crate::change::ContentChange;
use crate::position::Range;

/// A field of an update that distinguishes "absent" from "explicitly cleared".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    /// Field absent: inherit the cached value.
    #[default]
    Unchanged,
    /// Field explicitly null: clear the value.
    Clear,
    /// Field present.
    Set(T),
}

impl<T> FieldUpdate<T> {
    /// Resolve against the cached value.
    pub fn resolve(self, cached: Option<T>) -> Option<T> {
        match self {
            Self::Unchanged => cached,
            Self::Clear => None,
            Self::Set(value) => Some(value),
        }
    }

    /// The new value, if one was supplied.
    pub fn into_set(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unchanged | Self::Clear => None,
        }
    }

    /// Returns `true` if the field was absent.
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// `None` maps to [`FieldUpdate::Clear`].
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        }
    }
}

/// Client-declared state used to check the server's reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroundTruth {
    /// Content the client holds after the update.
    pub content: Option<String>,
    /// Selection the client holds after the update.
    pub selection: Option<Range>,
}

/// Test-harness metadata attached to an update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestingMetadata {
    /// Ground-truth document state.
    pub source_of_truth: Option<GroundTruth>,
    /// Text the client sees inside its selection.
    pub selected_text: Option<String>,
}

impl TestingMetadata {
    /// Returns `true` if nothing can be checked.
    pub fn is_empty(&self) -> bool {
        self.source_of_truth.is_none() && self.selected_text.is_none()
    }
}

/// A request to change one document.
///
/// `content` and `content_changes` treat an explicit null the same as absence. `selection` and
/// `visible_range` keep the distinction: absent inherits, null clears.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateMessage {
    /// Resource identifier.
    pub uri: String,
    /// Legacy path field; `uri` wins when both are present and disagree.
    pub file_path: Option<String>,
    /// Full replacement text.
    pub content: FieldUpdate<String>,
    /// Incremental edits in pre-edit coordinates.
    pub content_changes: FieldUpdate<Vec<ContentChange>>,
    /// Selection.
    pub selection: FieldUpdate<Range>,
    /// Visible range.
    pub visible_range: FieldUpdate<Range>,
    /// Ground-truth metadata from a test harness.
    pub testing: Option<TestingMetadata>,
}

impl UpdateMessage {
    /// Message that only names a resource.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Set the full replacement text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = FieldUpdate::Set(content.into());
        self
    }

    /// Set the incremental edits.
    pub fn with_changes(mut self, changes: Vec<ContentChange>) -> Self {
        self.content_changes = FieldUpdate::Set(changes);
        self
    }

    /// Set or clear the selection.
    pub fn with_selection(mut self, selection: Option<Range>) -> Self {
        self.selection = selection.into();
        self
    }

    /// Set or clear the visible range.
    pub fn with_visible_range(mut self, visible_range: Option<Range>) -> Self {
        self.visible_range = visible_range.into();
        self
    }

    /// Attach ground-truth metadata.
    pub fn with_testing(mut self, testing: TestingMetadata) -> Self {
        self.testing = Some(testing);
        self
    }
}
