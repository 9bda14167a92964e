//! Error types for document synchronization.
//!
//! Coordinate handling is total (everything clamps), so errors are reserved for batches the
//! model refuses to apply and operations this core deliberately does not implement.

use crate::position::Range;
use thiserror::Error;

/// Errors raised by the document model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Two edits of one incremental batch cover overlapping spans.
    #[error("overlapping edits in one batch: {first} and {second}")]
    OverlappingEdits {
        /// Earlier edit (by start offset).
        first: Range,
        /// Later edit that starts inside `first`.
        second: Range,
    },

    /// The operation exists on the editor API surface but is not supported by this core.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A caller still holds a read borrow of the document, so the update cannot be stored.
    #[error("document {0} is borrowed and cannot be updated")]
    DocumentInUse(String),

    /// Configuration could not be decoded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
