//! Line ending detection.
//!
//! Documents keep their content exactly as the client sent it, so a single buffer may mix LF
//! and CRLF terminators. The dominant convention is still useful when text is produced for the
//! document (programmatic edits, saving), so it is detected from the content.

/// A newline convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// Unix-style LF (`'\n'`).
    #[default]
    Lf,
    /// Windows-style CRLF (`"\r\n"`).
    Crlf,
}

impl LineEnding {
    /// Detect the dominant line ending of a text.
    ///
    /// Policy: any CRLF (`"\r\n"`) in the input means [`LineEnding::Crlf`], otherwise
    /// [`LineEnding::Lf`].
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// The terminator itself.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Rewrite every terminator in `text` (LF or CRLF) to this line ending.
    pub fn apply_to_text(self, text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        match self {
            Self::Lf => normalized,
            Self::Crlf => normalized.replace('\n', self.as_str()),
        }
    }
}
