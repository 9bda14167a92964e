//! Errors at the protocol edge.

use agent_docs::SyncError;
use std::io;
use thiserror::Error;

/// JSON-RPC error code for unknown methods.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC error code for malformed parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC error code for failures while handling a well-formed request.
pub const INTERNAL_ERROR: i64 = -32603;

/// Errors raised while decoding or dispatching protocol messages.
#[derive(Error, Debug)]
pub enum RpcError {
    /// A required field is missing.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present with the wrong shape.
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Expected shape.
        expected: &'static str,
    },

    /// The document model rejected the update.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Transport failure.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl RpcError {
    /// JSON-RPC error code reported for this error.
    pub fn code(&self) -> i64 {
        match self {
            Self::MissingField(_)
            | Self::InvalidField { .. }
            | Self::Sync(SyncError::InvalidConfig(_)) => INVALID_PARAMS,
            Self::Sync(_) | Self::Io(_) => INTERNAL_ERROR,
        }
    }
}
