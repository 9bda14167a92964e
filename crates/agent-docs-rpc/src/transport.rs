//! JSON-RPC stdio framing helpers.
//!
//! Messages are JSON values framed by HTTP-like headers:
//!
//! ```text
//! Content-Length: <n>\r\n
//! \r\n
//! <n bytes of UTF-8 JSON>
//! ```

use serde_json::{Map, Value};
use std::io::{self, BufRead, Write};

/// Write a single JSON-RPC message to `writer`.
pub fn write_message<W: Write>(writer: &mut W, value: &Value) -> io::Result<()> {
    let body =
        serde_json::to_vec(value).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Read a single JSON-RPC message from `reader`.
///
/// Returns `Ok(None)` on clean EOF.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<Value>> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    let mut saw_header = false;

    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            // Tolerate stray blank lines between frames.
            if !saw_header {
                continue;
            }
            break;
        }
        saw_header = true;

        if let Some((name, rest)) = trimmed.split_once(':')
            && name.trim().eq_ignore_ascii_case("Content-Length")
        {
            content_length = rest.trim().parse::<usize>().ok();
        }
    }

    let len = content_length.ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "Missing Content-Length header")
    })?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;

    let value: Value = serde_json::from_slice(&body)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    Ok(Some(value))
}

fn envelope() -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("jsonrpc".to_string(), Value::String("2.0".to_string()));
    obj
}

/// Build a request.
pub fn json_rpc_request(id: u64, method: &str, params: Value) -> Value {
    let mut obj = envelope();
    obj.insert("id".to_string(), Value::Number(id.into()));
    obj.insert("method".to_string(), Value::String(method.to_string()));
    obj.insert("params".to_string(), params);
    Value::Object(obj)
}

/// Build a notification.
pub fn json_rpc_notification(method: &str, params: Value) -> Value {
    let mut obj = envelope();
    obj.insert("method".to_string(), Value::String(method.to_string()));
    obj.insert("params".to_string(), params);
    Value::Object(obj)
}

/// Build a success response. `id` is echoed as received (number or string).
pub fn json_rpc_response(id: Value, result: Value) -> Value {
    let mut obj = envelope();
    obj.insert("id".to_string(), id);
    obj.insert("result".to_string(), result);
    Value::Object(obj)
}

/// Build an error response.
pub fn json_rpc_error_response(id: Value, code: i64, message: String) -> Value {
    let mut error = Map::new();
    error.insert("code".to_string(), Value::Number(code.into()));
    error.insert("message".to_string(), Value::String(message));

    let mut obj = envelope();
    obj.insert("id".to_string(), id);
    obj.insert("error".to_string(), Value::Object(error));
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_write_then_read() {
        let mut buf = Vec::new();
        let value = json_rpc_notification("textDocument/didOpen", json!({ "uri": "file:///a" }));
        write_message(&mut buf, &value).unwrap();
        write_message(&mut buf, &json!(1)).unwrap();

        let mut reader = Cursor::new(buf);
        assert_eq!(read_message(&mut reader).unwrap(), Some(value));
        assert_eq!(read_message(&mut reader).unwrap(), Some(json!(1)));
        assert_eq!(read_message(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_header_is_case_insensitive_and_extra_headers_ignored() {
        let body = br#"{"x":1}"#;
        let mut raw = format!(
            "content-length: {}\r\nContent-Type: application/vscode-jsonrpc\r\n\r\n",
            body.len()
        )
        .into_bytes();
        raw.extend_from_slice(body);
        let mut reader = Cursor::new(raw);
        assert_eq!(read_message(&mut reader).unwrap(), Some(json!({ "x": 1 })));
    }

    #[test]
    fn test_missing_length_is_invalid_data() {
        let mut reader = Cursor::new(b"X-Other: 1\r\n\r\n{}".to_vec());
        let err = read_message(&mut reader).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_error_response_shape() {
        let value = json_rpc_error_response(json!("a"), -32601, "nope".to_string());
        assert_eq!(value["id"], json!("a"));
        assert_eq!(value["error"]["code"], json!(-32601));
    }
}
