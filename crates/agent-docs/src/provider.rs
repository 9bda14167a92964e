//! Initial content for resources the client never opened.

use crate::uri::file_uri_to_path;
use std::fs;
use std::io;

/// Supplies the text of a resource that is not yet tracked.
pub trait ContentProvider {
    /// Read the full content of `uri`.
    fn read(&self, uri: &str) -> io::Result<String>;
}

/// Reads `file:` URIs from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileContentProvider;

impl ContentProvider for FileContentProvider {
    fn read(&self, uri: &str) -> io::Result<String> {
        let path = file_uri_to_path(uri).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("not a file URI: {uri}"),
            )
        })?;
        fs::read_to_string(path)
    }
}

/// Provider that never has content; every read fails with `NotFound`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContentProvider;

impl ContentProvider for NoContentProvider {
    fn read(&self, uri: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no content available for {uri}"),
        ))
    }
}

impl<F> ContentProvider for F
where
    F: Fn(&str) -> io::Result<String>,
{
    fn read(&self, uri: &str) -> io::Result<String> {
        self(uri)
    }
}
