//! Consistency verifier: compares client-declared ground truth against the reconstructed state.
//!
//! Only updates carrying testing metadata are checked, so production traffic never reaches the
//! failure handler. Every check runs independently and each mismatch is reported separately.

use crate::editor::TextEditor;
use crate::position::Range;
use crate::update::TestingMetadata;
use similar::TextDiff;
use std::fmt;

/// What diverged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// Document content differs from the client's.
    Content {
        /// Client content.
        expected: String,
        /// Server content.
        actual: String,
    },
    /// Primary selection differs. Visible ranges are never compared.
    Selection {
        /// Client selection.
        expected: Range,
        /// Server selection.
        actual: Range,
    },
    /// Text inside the selection differs.
    SelectedText {
        /// Client text.
        expected: String,
        /// Server text.
        actual: String,
    },
}

/// One divergence for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivergenceReport {
    /// Resource identifier.
    pub uri: String,
    /// Document version after the update that diverged.
    pub version: u64,
    /// The mismatch.
    pub divergence: Divergence,
}

impl DivergenceReport {
    /// Unified diff of client (`---`) against server (`+++`) text, if the divergence is textual.
    pub fn unified_diff(&self) -> Option<String> {
        let (expected, actual) = match &self.divergence {
            Divergence::Content { expected, actual }
            | Divergence::SelectedText { expected, actual } => (expected, actual),
            Divergence::Selection { .. } => return None,
        };
        Some(
            TextDiff::from_lines(expected.as_str(), actual.as_str())
                .unified_diff()
                .context_radius(3)
                .header("client", "server")
                .to_string(),
        )
    }
}

impl fmt::Display for DivergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match &self.divergence {
            Divergence::Content { .. } => "content",
            Divergence::Selection { .. } => "selection",
            Divergence::SelectedText { .. } => "selected text",
        };
        writeln!(
            f,
            "{} diverged for {} at version {}",
            what, self.uri, self.version
        )?;
        match &self.divergence {
            Divergence::Content { expected, actual }
            | Divergence::SelectedText { expected, actual } => {
                writeln!(f, "client:\n{expected}")?;
                writeln!(f, "server:\n{actual}")?;
                if let Some(diff) = self.unified_diff() {
                    write!(f, "{diff}")?;
                }
            }
            Divergence::Selection { expected, actual } => {
                writeln!(f, "client: {expected}")?;
                writeln!(f, "server: {actual}")?;
            }
        }
        Ok(())
    }
}

/// Callback invoked once per divergence.
pub type FailureHandler = Box<dyn Fn(&DivergenceReport)>;

/// Default handler: write the report to stderr and abort.
pub fn abort_on_divergence(report: &DivergenceReport) {
    tracing::error!(uri = report.uri.as_str(), version = report.version, "document divergence");
    eprintln!("{report}");
    std::process::abort();
}

/// Runs ground-truth checks after an update.
pub struct ConsistencyVerifier {
    handler: FailureHandler,
}

impl Default for ConsistencyVerifier {
    fn default() -> Self {
        Self::new(abort_on_divergence)
    }
}

impl fmt::Debug for ConsistencyVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsistencyVerifier").finish_non_exhaustive()
    }
}

impl ConsistencyVerifier {
    /// Verifier calling `handler` on each divergence.
    pub fn new(handler: impl Fn(&DivergenceReport) + 'static) -> Self {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Check `editor`'s state against `testing`. Returns the number of divergences reported.
    pub fn verify(&self, editor: &TextEditor, testing: &TestingMetadata) -> usize {
        let (uri, version, content) = {
            let document = editor.document().read();
            (
                document.uri().to_string(),
                document.version(),
                document.get_text(None),
            )
        };

        let mut found = Vec::new();
        if let Some(truth) = &testing.source_of_truth {
            if let Some(expected) = &truth.content
                && *expected != content
            {
                found.push(Divergence::Content {
                    expected: expected.clone(),
                    actual: content,
                });
            }
            let actual = editor.selection();
            if let Some(expected) = truth.selection
                && expected != actual
            {
                found.push(Divergence::Selection { expected, actual });
            }
        }
        if let Some(expected) = &testing.selected_text {
            let actual = editor.selected_text();
            if *expected != actual {
                found.push(Divergence::SelectedText {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let count = found.len();
        for divergence in found {
            let report = DivergenceReport {
                uri: uri.clone(),
                version,
                divergence,
            };
            tracing::error!(uri = uri.as_str(), "{}", report);
            (self.handler)(&report);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentRef, Snapshot};
    use crate::update::GroundTruth;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn collecting() -> (ConsistencyVerifier, Rc<RefCell<Vec<DivergenceReport>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let verifier = ConsistencyVerifier::new(move |report: &DivergenceReport| {
            sink.borrow_mut().push(report.clone());
        });
        (verifier, seen)
    }

    fn editor(content: &str, selection: Option<Range>) -> TextEditor {
        let mut snapshot = Snapshot::new("file:///v.txt", content);
        snapshot.selection = selection;
        TextEditor::new(DocumentRef::new(Document::new("file:///v.txt", snapshot)))
    }

    #[test]
    fn test_matching_state_reports_nothing() {
        let (verifier, seen) = collecting();
        let testing = TestingMetadata {
            source_of_truth: Some(GroundTruth {
                content: Some("abc".to_string()),
                selection: Some(Range::from_coords(0, 0, 0, 2)),
            }),
            selected_text: Some("ab".to_string()),
        };
        let editor = editor("abc", Some(Range::from_coords(0, 0, 0, 2)));
        assert_eq!(verifier.verify(&editor, &testing), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_content_mismatch_reports_both_sides() {
        let (verifier, seen) = collecting();
        let testing = TestingMetadata {
            source_of_truth: Some(GroundTruth {
                content: Some("client text\n".to_string()),
                selection: None,
            }),
            selected_text: None,
        };
        assert_eq!(verifier.verify(&editor("server text\n", None), &testing), 1);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        let rendered = seen[0].to_string();
        assert!(rendered.contains("client text"));
        assert!(rendered.contains("server text"));
        assert!(rendered.contains("--- client"));
        assert!(rendered.contains("+++ server"));
    }

    #[test]
    fn test_selection_and_selected_text_are_independent_checks() {
        let (verifier, seen) = collecting();
        let testing = TestingMetadata {
            source_of_truth: Some(GroundTruth {
                content: None,
                selection: Some(Range::from_coords(0, 1, 0, 3)),
            }),
            selected_text: Some("bc".to_string()),
        };
        assert_eq!(verifier.verify(&editor("abcd", None), &testing), 2);
        let kinds: Vec<_> = seen
            .borrow()
            .iter()
            .map(|r| std::mem::discriminant(&r.divergence))
            .collect();
        assert_ne!(kinds[0], kinds[1]);
    }
}
