//! Document registry: exactly one [`Document`] per resource, resolved from update messages.
//!
//! The registry is an ordinary value owned by its caller. Entries are keyed by
//! [`canonical_uri`], so differently spelled identifiers for one resource share a document.
//!
//! Resolution of an update for a known resource:
//!
//! 1. non-empty `content_changes` go through the patch applier and define the new text
//! 2. otherwise a present `content` is the new text, diffed against the cached one for events
//! 3. otherwise the cached text is kept
//! 4. absent `selection`/`visible_range` inherit the cached values, explicit nulls clear them
//! 5. the document is updated in place
//! 6. ground-truth metadata, if any, is checked by the [`ConsistencyVerifier`]

use crate::change::ChangeEvent;
use crate::config::SyncConfig;
use crate::diff::ContentDiff;
use crate::document::{Document, DocumentRef, Snapshot};
use crate::editor::TextEditor;
use crate::error::SyncError;
use crate::patch::apply_content_changes;
use crate::provider::{ContentProvider, FileContentProvider};
use crate::update::{FieldUpdate, UpdateMessage};
use crate::uri::{canonical_uri, file_uri_to_path, split_scheme};
use crate::verify::ConsistencyVerifier;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// How an update was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// The resource was not tracked; a document was created.
    Opened,
    /// Incremental edits were applied.
    Incremental,
    /// A full replacement text was applied.
    FullText,
    /// Only selection or visible range changed.
    MetadataOnly,
}

/// Result of [`DocumentRegistry::apply_update`].
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// The live document.
    pub document: DocumentRef,
    /// Its editor surface.
    pub editor: TextEditor,
    /// Resolution path taken.
    pub kind: UpdateKind,
    /// Change events in pre-update coordinates. Empty for newly opened documents.
    pub changes: Vec<ChangeEvent>,
    /// Whether the content differs from before the update.
    pub content_changed: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    document: DocumentRef,
    editor: TextEditor,
}

impl Entry {
    fn new(document: Document) -> Self {
        let document = DocumentRef::new(document);
        Self {
            editor: TextEditor::new(document.clone()),
            document,
        }
    }
}

/// Table of live documents.
pub struct DocumentRegistry {
    entries: BTreeMap<String, Entry>,
    config: SyncConfig,
    provider: Box<dyn ContentProvider>,
    verifier: ConsistencyVerifier,
}

impl fmt::Debug for DocumentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRegistry")
            .field("uris", &self.entries.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl DocumentRegistry {
    /// Empty registry reading unopened files from disk and aborting on divergence.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            entries: BTreeMap::new(),
            config,
            provider: Box::new(FileContentProvider),
            verifier: ConsistencyVerifier::default(),
        }
    }

    /// Replace the content provider.
    pub fn with_content_provider(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    /// Replace the consistency verifier.
    pub fn with_verifier(mut self, verifier: ConsistencyVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Mutable configuration, for settings that arrive after construction.
    pub fn config_mut(&mut self) -> &mut SyncConfig {
        &mut self.config
    }

    /// Workspace root reported by the client, if any.
    pub fn workspace_root_uri(&self) -> Option<&str> {
        self.config.workspace_root_uri.as_deref()
    }

    /// Number of tracked documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no documents are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `uri` is tracked.
    pub fn contains(&self, uri: &str) -> bool {
        self.entries.contains_key(&canonical_uri(uri))
    }

    /// The live document for `uri`.
    pub fn document(&self, uri: &str) -> Option<DocumentRef> {
        self.entries
            .get(&canonical_uri(uri))
            .map(|entry| entry.document.clone())
    }

    /// The editor surface for `uri`.
    pub fn editor(&self, uri: &str) -> Option<TextEditor> {
        self.entries
            .get(&canonical_uri(uri))
            .map(|entry| entry.editor.clone())
    }

    /// Identifiers of all tracked documents, in canonical order.
    pub fn uris(&self) -> Vec<String> {
        self.entries
            .values()
            .map(|entry| entry.document.uri())
            .collect()
    }

    /// All tracked documents.
    pub fn documents(&self) -> Vec<DocumentRef> {
        self.entries
            .values()
            .map(|entry| entry.document.clone())
            .collect()
    }

    /// All editor surfaces.
    pub fn editors(&self) -> Vec<TextEditor> {
        self.entries
            .values()
            .map(|entry| entry.editor.clone())
            .collect()
    }

    /// Editors whose document reports a visible range.
    pub fn visible_editors(&self) -> Vec<TextEditor> {
        self.entries
            .values()
            .filter(|entry| entry.document.read().visible_range().is_some())
            .map(|entry| entry.editor.clone())
            .collect()
    }

    /// Stop tracking `uri`. Existing handles keep the last state.
    pub fn close(&mut self, uri: &str) -> Option<DocumentRef> {
        let removed = self.entries.remove(&canonical_uri(uri));
        if removed.is_some() {
            tracing::debug!(uri, "closed document");
        }
        removed.map(|entry| entry.document)
    }

    /// The live document for `uri`, seeding it from the content provider if it is not tracked.
    pub fn get_or_load(&mut self, uri: &str) -> DocumentRef {
        let key = canonical_uri(uri);
        if let Some(entry) = self.entries.get(&key) {
            return entry.document.clone();
        }
        let content = self.load_content(uri);
        let entry = Entry::new(Document::new(uri, Snapshot::new(uri, content)));
        let document = entry.document.clone();
        self.entries.insert(key, entry);
        document
    }

    fn load_content(&self, uri: &str) -> String {
        if !self.config.load_unopened_from_disk {
            return String::new();
        }
        match self.provider.read(uri) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(uri, error = %err, "could not read unopened resource; using empty content");
                String::new()
            }
        }
    }

    /// Resolve `message` against the tracked state.
    ///
    /// Fails only for overlapping incremental edits, in which case nothing is modified.
    pub fn apply_update(&mut self, message: UpdateMessage) -> Result<UpdateOutcome, SyncError> {
        check_legacy_path(&message);
        let key = canonical_uri(&message.uri);

        let outcome = match self.entries.get(&key) {
            Some(entry) => {
                let entry = entry.clone();
                self.update_existing(entry, &message)?
            }
            None => self.open(key, &message)?,
        };

        if self.config.verify_consistency
            && let Some(testing) = &message.testing
            && !testing.is_empty()
        {
            self.verifier.verify(&outcome.editor, testing);
        }
        Ok(outcome)
    }

    fn open(&mut self, key: String, message: &UpdateMessage) -> Result<UpdateOutcome, SyncError> {
        let content = match &message.content {
            FieldUpdate::Set(content) => content.clone(),
            FieldUpdate::Unchanged | FieldUpdate::Clear => self.load_content(&message.uri),
        };
        let mut document = Document::new(&message.uri, Snapshot::new(&message.uri, content));

        if let FieldUpdate::Set(changes) = &message.content_changes
            && !changes.is_empty()
        {
            let patched = apply_content_changes(&document, changes)?;
            document = Document::new(&message.uri, Snapshot::new(&message.uri, patched.text));
        }
        if !(message.selection.is_unchanged() && message.visible_range.is_unchanged()) {
            let mut snapshot = document.snapshot();
            snapshot.selection = message.selection.clone().resolve(None);
            snapshot.visible_range = message.visible_range.clone().resolve(None);
            document = Document::new(&message.uri, snapshot);
        }

        tracing::debug!(uri = message.uri.as_str(), "opened document");
        let entry = Entry::new(document);
        self.entries.insert(key, entry.clone());
        Ok(UpdateOutcome {
            document: entry.document,
            editor: entry.editor,
            kind: UpdateKind::Opened,
            changes: Vec::new(),
            content_changed: true,
        })
    }

    fn update_existing(
        &self,
        entry: Entry,
        message: &UpdateMessage,
    ) -> Result<UpdateOutcome, SyncError> {
        let (kind, content, changes, selection, visible_range) = {
            let document = entry.document.read();
            let changes_in = match &message.content_changes {
                FieldUpdate::Set(changes) if !changes.is_empty() => Some(changes),
                _ => None,
            };

            let (kind, content, changes) = if let Some(changes) = changes_in {
                let patched = apply_content_changes(&document, changes)?;
                (UpdateKind::Incremental, patched.text, patched.changes)
            } else if let FieldUpdate::Set(content) = &message.content {
                let changes = if self.config.diff_full_text_updates {
                    ContentDiff::compute(&document, content).iter().collect()
                } else {
                    Vec::new()
                };
                (UpdateKind::FullText, content.clone(), changes)
            } else {
                (UpdateKind::MetadataOnly, document.get_text(None), Vec::new())
            };

            (
                kind,
                content,
                changes,
                message.selection.clone().resolve(document.selection()),
                message.visible_range.clone().resolve(document.visible_range()),
            )
        };

        tracing::debug!(
            uri = message.uri.as_str(),
            ?kind,
            changes = changes.len(),
            "resolved update"
        );
        let content_changed = entry.document.update(Snapshot {
            uri: message.uri.clone(),
            content,
            selection,
            visible_range,
        })?;

        Ok(UpdateOutcome {
            document: entry.document,
            editor: entry.editor,
            kind,
            changes,
            content_changed,
        })
    }
}

fn check_legacy_path(message: &UpdateMessage) {
    let Some(file_path) = message.file_path.as_deref() else {
        return;
    };
    let matches = if split_scheme(file_path).is_some_and(|(scheme, _)| scheme.len() > 1) {
        canonical_uri(file_path) == canonical_uri(&message.uri)
    } else {
        file_uri_to_path(&message.uri).is_some_and(|path| path == Path::new(file_path))
    };
    if !matches {
        tracing::warn!(
            uri = message.uri.as_str(),
            file_path,
            "filePath does not match uri; using uri"
        );
    }
}
