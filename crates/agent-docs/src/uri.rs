//! Resource identifier helpers.
//!
//! Resources are identified by URI strings. Clients are not consistent about spelling the same
//! resource (scheme case, percent-encoding, drive-letter case), so the registry keys documents
//! by [`canonical_uri`] rather than by the raw string.

use std::fs;
use std::path::{Path, PathBuf};

/// Convert a local filesystem path to a `file://` URI.
pub fn path_to_file_uri(path: &Path) -> String {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut path_str = abs.to_string_lossy().to_string();

    // Normalize to forward slashes for URIs.
    if cfg!(windows) {
        path_str = path_str.replace('\\', "/");
        if !path_str.starts_with('/') {
            path_str.insert(0, '/');
        }
    }

    format!("file://{}", percent_encode_path(&path_str))
}

/// Percent-encode a path for URIs.
///
/// Keeps unreserved bytes and `/`, percent-encodes the rest.
pub fn percent_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for &b in path.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

/// Percent-decode a URI path component.
pub fn percent_decode_path(path: &str) -> String {
    fn hex_val(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = path.as_bytes();
    let mut out = Vec::<u8>::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).to_string()
}

/// Convert a `file://` URI back into a local filesystem path.
pub fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    let (scheme, rest) = split_scheme(uri)?;
    if !scheme.eq_ignore_ascii_case("file") {
        return None;
    }
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);

    let mut path_str = percent_decode_path(rest);

    // `file:///C:/...` -> `C:/...`
    if cfg!(windows) {
        if path_str.starts_with('/') && path_str.get(2..3) == Some(":") {
            path_str.remove(0);
        }
        path_str = path_str.replace('/', "\\");
    }

    Some(PathBuf::from(path_str))
}

/// Split `scheme:rest`. Returns `None` when `uri` has no valid scheme.
pub fn split_scheme(uri: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, rest))
}

/// Canonical string form of a resource identifier.
///
/// - the scheme is lower-cased
/// - `file:` URIs drop a `localhost` authority, lower-case a Windows drive letter, and re-encode
///   their path so `%3a`, `%3A` and `:` spellings collapse to one form
/// - strings without a scheme are returned trimmed but otherwise untouched
pub fn canonical_uri(uri: &str) -> String {
    let uri = uri.trim();
    let Some((scheme, rest)) = split_scheme(uri) else {
        return uri.to_string();
    };
    let scheme = scheme.to_ascii_lowercase();
    if scheme != "file" {
        return format!("{scheme}:{rest}");
    }

    let path = rest.strip_prefix("//").unwrap_or(rest);
    let path = path.strip_prefix("localhost").unwrap_or(path);
    let mut decoded = percent_decode_path(path);
    if decoded.as_bytes().get(2) == Some(&b':')
        && decoded.starts_with('/')
        && decoded.as_bytes()[1].is_ascii_alphabetic()
    {
        decoded[1..2].make_ascii_lowercase();
    }
    format!("file://{}", percent_encode_path(&decoded))
}

/// Last path segment of a URI, percent-decoded (`untitled:Untitled-1` -> `Untitled-1`).
pub fn file_name(uri: &str) -> String {
    let rest = split_scheme(uri).map_or(uri, |(_, rest)| rest);
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);
    let segment = rest.rsplit('/').next().unwrap_or(rest);
    percent_decode_path(segment)
}
