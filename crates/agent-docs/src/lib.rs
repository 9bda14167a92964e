#![warn(missing_docs)]
//! Agent Docs - Authoritative Document Model for Editor Agents
//!
//! # Overview
//!
//! `agent-docs` keeps one in-memory text document per resource, synchronized with a remote
//! editor client that sends full snapshots, incremental edits, or selection-only updates. It
//! converts between linear character offsets and `(line, character)` positions under mixed
//! LF/CRLF content, and reports every update as a list of change events regardless of how the
//! client described it.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  DocumentRegistry (update resolution)       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  ConsistencyVerifier (ground-truth checks)  │  ← Test harnesses
//! ├─────────────────────────────────────────────┤
//! │  Patch Applier  │  Diff Calculator          │  ← Change events
//! ├─────────────────────────────────────────────┤
//! │  Document / DocumentRef / TextEditor        │  ← Shared state
//! ├─────────────────────────────────────────────┤
//! │  OffsetIndex (line-start table)             │  ← Coordinates
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use agent_docs::{ContentChange, DocumentRegistry, Range, UpdateMessage};
//!
//! let mut registry = DocumentRegistry::default();
//! let opened = registry
//!     .apply_update(UpdateMessage::new("untitled:Untitled-1").with_content("abc\ndef"))
//!     .unwrap();
//!
//! let outcome = registry
//!     .apply_update(
//!         UpdateMessage::new("untitled:Untitled-1")
//!             .with_changes(vec![ContentChange::new(Range::from_coords(1, 0, 1, 1), "D")]),
//!     )
//!     .unwrap();
//!
//! // Earlier handles observe the update.
//! assert_eq!(opened.document.text(), "abc\nDef");
//! assert_eq!(outcome.changes[0].range_offset, 4);
//! ```
//!
//! # Coordinates
//!
//! Offsets count Unicode scalar values. Every coordinate conversion clamps instead of failing:
//! lines past the end map to the content length, characters past a line's end map to the end
//! of that line including its terminator.

pub mod change;
pub mod config;
pub mod diff;
pub mod document;
pub mod editor;
pub mod error;
pub mod line_ending;
pub mod offsets;
pub mod patch;
pub mod position;
pub mod provider;
pub mod registry;
pub mod update;
pub mod uri;
pub mod verify;

pub use change::{ChangeEvent, ContentChange};
pub use config::{SyncConfig, parse_env_flag};
pub use diff::{ContentDiff, DiffEdit, diff_edits};
pub use document::{Document, DocumentRef, Snapshot, TextLine};
pub use editor::{EditBuilder, EditRequest, TextEdit, TextEditor};
pub use error::SyncError;
pub use line_ending::LineEnding;
pub use offsets::OffsetIndex;
pub use patch::{PatchOutcome, apply_content_changes};
pub use position::{Position, Range};
pub use provider::{ContentProvider, FileContentProvider, NoContentProvider};
pub use registry::{DocumentRegistry, UpdateKind, UpdateOutcome};
pub use update::{FieldUpdate, GroundTruth, TestingMetadata, UpdateMessage};
pub use verify::{ConsistencyVerifier, Divergence, DivergenceReport, FailureHandler};
