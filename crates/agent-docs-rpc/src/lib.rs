#![warn(missing_docs)]
//! JSON-RPC edge for `agent-docs`.
//!
//! Decodes `textDocument/*` notifications into [`agent_docs::UpdateMessage`]s, feeds them to a
//! [`agent_docs::DocumentRegistry`], and encodes change events and outbound edit requests. The
//! `agent-docs` binary runs [`AgentDocumentServer::serve`] over stdio.

pub mod error;
pub mod server;
pub mod transport;
pub mod wire;

pub use error::RpcError;
pub use server::{AgentDocumentServer, DocumentEvent, DocumentEventCallback, Flow};
pub use transport::{read_message, write_message};
pub use wire::{change_event_to_value, edit_request_to_value, update_message_from_value};
