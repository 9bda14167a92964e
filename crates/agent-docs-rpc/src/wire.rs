//! Conversions between JSON payloads and the document model.
//!
//! Parsing walks `serde_json::Value` by hand instead of deriving, because the protocol gives
//! absent and `null` fields different meanings for `selection` and `visibleRange`.

use crate::error::RpcError;
use agent_docs::uri::path_to_file_uri;
use agent_docs::{
    ChangeEvent, ContentChange, EditRequest, FieldUpdate, GroundTruth, Position, Range,
    TestingMetadata, TextEdit, UpdateMessage,
};
use serde_json::{Value, json};
use std::path::Path;

/// Parse a `{line, character}` object.
pub fn position_from_value(value: &Value) -> Option<Position> {
    Some(Position::new(
        value.get("line")?.as_u64()? as usize,
        value.get("character")?.as_u64()? as usize,
    ))
}

/// Parse a `{start, end}` object.
pub fn range_from_value(value: &Value) -> Option<Range> {
    Some(Range::new(
        position_from_value(value.get("start")?)?,
        position_from_value(value.get("end")?)?,
    ))
}

/// Encode a position.
pub fn position_to_value(position: Position) -> Value {
    json!({ "line": position.line, "character": position.character })
}

/// Encode a range.
pub fn range_to_value(range: Range) -> Value {
    json!({ "start": position_to_value(range.start), "end": position_to_value(range.end) })
}

fn nullable_string(value: &Value, field: &'static str) -> Result<Option<String>, RpcError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RpcError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn range_field(value: &Value, field: &'static str) -> Result<FieldUpdate<Range>, RpcError> {
    match value.get(field) {
        None => Ok(FieldUpdate::Unchanged),
        Some(Value::Null) => Ok(FieldUpdate::Clear),
        Some(range) => range_from_value(range)
            .map(FieldUpdate::Set)
            .ok_or(RpcError::InvalidField {
                field,
                expected: "a range",
            }),
    }
}

fn content_changes(value: &Value) -> Result<FieldUpdate<Vec<ContentChange>>, RpcError> {
    let items = match value.get("contentChanges") {
        None | Some(Value::Null) => return Ok(FieldUpdate::Unchanged),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(RpcError::InvalidField {
                field: "contentChanges",
                expected: "an array",
            });
        }
    };

    items
        .iter()
        .map(|item| -> Result<ContentChange, RpcError> {
            let range = item
                .get("range")
                .and_then(range_from_value)
                .ok_or(RpcError::InvalidField {
                    field: "contentChanges",
                    expected: "edits with a range",
                })?;
            let text = item.get("text").and_then(Value::as_str).unwrap_or("");
            Ok(ContentChange::new(range, text))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(FieldUpdate::Set)
}

fn testing_metadata(value: &Value) -> Result<Option<TestingMetadata>, RpcError> {
    let Some(testing) = value.get("testing").filter(|t| !t.is_null()) else {
        return Ok(None);
    };

    let source_of_truth = match testing.get("sourceOfTruthDocument") {
        None | Some(Value::Null) => None,
        Some(truth) => Some(GroundTruth {
            content: nullable_string(truth, "content")?,
            selection: range_field(truth, "selection")?.into_set(),
        }),
    };
    Ok(Some(TestingMetadata {
        source_of_truth,
        selected_text: nullable_string(testing, "selectedText")?,
    }))
}

/// Decode a text-document payload (`didOpen`/`didChange`/`didFocus`/`didClose` params).
///
/// `uri` is required unless the legacy `filePath` field is present, in which case the path is
/// converted to a `file:` URI.
pub fn update_message_from_value(value: &Value) -> Result<UpdateMessage, RpcError> {
    let file_path = nullable_string(value, "filePath")?;
    let uri = match (nullable_string(value, "uri")?, &file_path) {
        (Some(uri), _) => uri,
        (None, Some(path)) => path_to_file_uri(Path::new(path)),
        (None, None) => return Err(RpcError::MissingField("uri")),
    };

    Ok(UpdateMessage {
        uri,
        file_path,
        content: nullable_string(value, "content")?.map_or(FieldUpdate::Unchanged, FieldUpdate::Set),
        content_changes: content_changes(value)?,
        selection: range_field(value, "selection")?,
        visible_range: range_field(value, "visibleRange")?,
        testing: testing_metadata(value)?,
    })
}

/// Encode a change event.
pub fn change_event_to_value(event: &ChangeEvent) -> Value {
    json!({
        "range": range_to_value(event.range),
        "rangeOffset": event.range_offset,
        "rangeLength": event.range_length,
        "text": event.text,
    })
}

/// Encode `textDocument/edit` params.
pub fn edit_request_to_value(request: &EditRequest) -> Value {
    let edits = request
        .edits
        .iter()
        .map(|edit| match edit {
            TextEdit::Replace { range, value } => {
                json!({ "type": "replace", "range": range_to_value(*range), "value": value })
            }
            TextEdit::Insert { position, value } => {
                json!({ "type": "insert", "position": position_to_value(*position), "value": value })
            }
            TextEdit::Delete { range } => json!({ "type": "delete", "range": range_to_value(*range) }),
        })
        .collect::<Vec<_>>();
    json!({ "uri": request.uri, "edits": edits })
}
