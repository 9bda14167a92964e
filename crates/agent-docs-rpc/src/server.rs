//! Notification server: routes `textDocument/*` traffic into a [`DocumentRegistry`].
//!
//! The server is single-threaded. Each inbound message is handled to completion before the
//! next one is read, so updates for one resource apply in arrival order.

use crate::error::{METHOD_NOT_FOUND, RpcError};
use crate::transport::{
    json_rpc_error_response, json_rpc_request, json_rpc_response, read_message, write_message,
};
use crate::wire::{edit_request_to_value, update_message_from_value};
use agent_docs::uri::{canonical_uri, path_to_file_uri};
use agent_docs::{ChangeEvent, DocumentRef, DocumentRegistry, EditRequest, TextEditor};
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::path::Path;

static NULL: Value = Value::Null;

/// Something that happened to a tracked document.
#[derive(Debug, Clone)]
pub enum DocumentEvent {
    /// A document became tracked.
    Opened {
        /// The document.
        document: DocumentRef,
    },
    /// A tracked document was updated.
    Changed {
        /// The document.
        document: DocumentRef,
        /// Edits in pre-update coordinates.
        changes: Vec<ChangeEvent>,
    },
    /// The client moved focus to a document.
    Focused {
        /// The document.
        document: DocumentRef,
    },
    /// A document stopped being tracked.
    Closed {
        /// Identifier of the closed resource.
        uri: String,
    },
}

/// Callback receiving [`DocumentEvent`]s.
pub type DocumentEventCallback = Box<dyn FnMut(&DocumentEvent)>;

/// Whether the serve loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// `exit` was received.
    Exit,
}

/// Dispatches protocol messages to a registry and tracks the active editor.
pub struct AgentDocumentServer {
    registry: DocumentRegistry,
    active_editor: Option<TextEditor>,
    subscribers: Vec<DocumentEventCallback>,
    outbox: Vec<Value>,
    next_request_id: u64,
    shutdown_requested: bool,
}

impl AgentDocumentServer {
    /// Server backed by `registry`.
    pub fn new(registry: DocumentRegistry) -> Self {
        Self {
            registry,
            active_editor: None,
            subscribers: Vec::new(),
            outbox: Vec::new(),
            next_request_id: 1,
            shutdown_requested: false,
        }
    }

    /// The registry.
    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    /// Editor the client last opened, changed or focused.
    pub fn active_editor(&self) -> Option<&TextEditor> {
        self.active_editor.as_ref()
    }

    /// Returns `true` once `shutdown` has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Register a callback for document events.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&DocumentEvent) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    fn emit(&mut self, event: DocumentEvent) {
        for callback in &mut self.subscribers {
            callback(&event);
        }
    }

    /// Queue a `textDocument/edit` request for the client. Returns the request id.
    pub fn request_edit(&mut self, request: &EditRequest) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.outbox.push(json_rpc_request(
            id,
            "textDocument/edit",
            edit_request_to_value(request),
        ));
        id
    }

    /// Drain messages queued for the client.
    pub fn take_outbound(&mut self) -> Vec<Value> {
        std::mem::take(&mut self.outbox)
    }

    /// Handle a notification.
    pub fn handle_notification(&mut self, method: &str, params: &Value) -> Result<Flow, RpcError> {
        match method {
            "textDocument/didOpen" | "textDocument/didChange" => {
                let message = update_message_from_value(params)?;
                let outcome = self.registry.apply_update(message)?;
                self.active_editor = Some(outcome.editor);
                let event = if method == "textDocument/didOpen" {
                    DocumentEvent::Opened {
                        document: outcome.document,
                    }
                } else {
                    DocumentEvent::Changed {
                        document: outcome.document,
                        changes: outcome.changes,
                    }
                };
                self.emit(event);
            }
            "textDocument/didFocus" => {
                let message = update_message_from_value(params)?;
                let editor = match self.registry.editor(&message.uri) {
                    Some(editor) => editor,
                    None => self.registry.apply_update(message)?.editor,
                };
                let document = editor.document().clone();
                self.active_editor = Some(editor);
                self.emit(DocumentEvent::Focused { document });
            }
            "textDocument/didClose" => {
                let message = update_message_from_value(params)?;
                let key = canonical_uri(&message.uri);
                if self
                    .active_editor
                    .as_ref()
                    .is_some_and(|editor| canonical_uri(&editor.document().uri()) == key)
                {
                    self.active_editor = None;
                }
                if self.registry.close(&message.uri).is_some() {
                    self.emit(DocumentEvent::Closed { uri: message.uri });
                }
            }
            "initialized" => {}
            "exit" => return Ok(Flow::Exit),
            _ => tracing::debug!(method, "ignoring notification"),
        }
        Ok(Flow::Continue)
    }

    /// Handle a request and build its response.
    pub fn handle_request(&mut self, id: Value, method: &str, params: &Value) -> Value {
        match method {
            "initialize" => match self.initialize(params) {
                Ok(result) => json_rpc_response(id, result),
                Err(err) => json_rpc_error_response(id, err.code(), err.to_string()),
            },
            "shutdown" => {
                self.shutdown_requested = true;
                json_rpc_response(id, Value::Null)
            }
            _ => json_rpc_error_response(
                id,
                METHOD_NOT_FOUND,
                format!("method not found: {method}"),
            ),
        }
    }

    /// Apply the client's workspace root and `extensionConfiguration` to the registry.
    ///
    /// The root comes from `workspaceRootUri`, else from `workspaceRootPath` converted to a
    /// `file:` URI. A malformed configuration leaves the registry settings untouched.
    fn initialize(&mut self, params: &Value) -> Result<Value, RpcError> {
        let mut config = self.registry.config().clone();
        config.merge_value(params.get("extensionConfiguration").unwrap_or(&NULL))?;

        let root = params
            .get("workspaceRootUri")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                params
                    .get("workspaceRootPath")
                    .and_then(Value::as_str)
                    .map(|path| path_to_file_uri(Path::new(path)))
            });
        if let Some(root) = root {
            tracing::info!(root = root.as_str(), "client workspace");
            config.workspace_root_uri = Some(root);
        }

        *self.registry.config_mut() = config;
        Ok(json!({ "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
    }

    /// Handle one inbound message, returning the response for requests.
    ///
    /// Notification failures are logged and swallowed, since there is no one to answer.
    pub fn handle_message(&mut self, message: &Value) -> (Option<Value>, Flow) {
        let method = message.get("method").and_then(Value::as_str);
        let params = message.get("params").unwrap_or(&NULL);
        match (message.get("id").cloned(), method) {
            (Some(id), Some(method)) => (Some(self.handle_request(id, method, params)), Flow::Continue),
            (None, Some(method)) => match self.handle_notification(method, params) {
                Ok(flow) => (None, flow),
                Err(err) => {
                    tracing::warn!(method, error = %err, "notification failed");
                    (None, Flow::Continue)
                }
            },
            (Some(id), None) => {
                tracing::debug!(%id, "response from client");
                (None, Flow::Continue)
            }
            (None, None) => {
                tracing::warn!("message without method or id");
                (None, Flow::Continue)
            }
        }
    }

    /// Run the framed message loop until `exit` or end of input.
    pub fn serve<R: BufRead, W: Write>(&mut self, mut reader: R, mut writer: W) -> Result<(), RpcError> {
        while let Some(message) = read_message(&mut reader)? {
            let (response, flow) = self.handle_message(&message);
            if let Some(response) = response {
                write_message(&mut writer, &response)?;
            }
            for outbound in self.take_outbound() {
                write_message(&mut writer, &outbound)?;
            }
            if flow == Flow::Exit {
                tracing::info!("exit requested");
                break;
            }
        }
        Ok(())
    }
}
