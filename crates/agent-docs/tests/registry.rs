use agent_docs::{
    ConsistencyVerifier, ContentChange, DivergenceReport, DocumentRegistry, FileContentProvider,
    GroundTruth, NoContentProvider, Range, SyncConfig, TestingMetadata, UpdateKind, UpdateMessage,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

const URI: &str = "file:///work/src/main.rs";

fn collecting_registry(config: SyncConfig) -> (DocumentRegistry, Rc<RefCell<Vec<DivergenceReport>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let registry = DocumentRegistry::new(config)
        .with_content_provider(NoContentProvider)
        .with_verifier(ConsistencyVerifier::new(move |report: &DivergenceReport| {
            sink.borrow_mut().push(report.clone());
        }));
    (registry, seen)
}

#[test]
fn test_earlier_handles_observe_later_updates() {
    let mut registry = DocumentRegistry::default().with_content_provider(NoContentProvider);
    let first = registry.get_or_load(URI);
    assert_eq!(first.text(), "");

    registry
        .apply_update(UpdateMessage::new(URI).with_content("fn main() {}\n"))
        .unwrap();
    let second = registry.get_or_load(URI);

    assert!(first.ptr_eq(&second));
    assert_eq!(first.text(), "fn main() {}\n");
    assert_eq!(first.read().language_id(), "rust");
}

#[test]
fn test_identical_full_text_produces_no_events() {
    let mut registry = DocumentRegistry::default();
    registry
        .apply_update(UpdateMessage::new(URI).with_content("same\ntext\n"))
        .unwrap();
    let outcome = registry
        .apply_update(UpdateMessage::new(URI).with_content("same\ntext\n"))
        .unwrap();

    assert_eq!(outcome.kind, UpdateKind::FullText);
    assert!(outcome.changes.is_empty());
    assert!(!outcome.content_changed);
    assert_eq!(outcome.document.version(), 1);
}

#[test]
fn test_full_text_update_reports_change_events() {
    let mut registry = DocumentRegistry::default();
    registry
        .apply_update(UpdateMessage::new(URI).with_content("let x = 1;\n"))
        .unwrap();
    let outcome = registry
        .apply_update(UpdateMessage::new(URI).with_content("let x = 42;\n"))
        .unwrap();

    assert!(outcome.content_changed);
    assert!(!outcome.changes.is_empty());
    for event in &outcome.changes {
        assert_eq!(event.range.start.line, 0);
    }
    assert_eq!(outcome.document.text(), "let x = 42;\n");
}

#[test]
fn test_three_independent_replacements() {
    let mut registry = DocumentRegistry::default();
    registry
        .apply_update(UpdateMessage::new(URI).with_content("abc\ndef\nghi"))
        .unwrap();
    let outcome = registry
        .apply_update(UpdateMessage::new(URI).with_changes(vec![
            ContentChange::new(Range::from_coords(0, 0, 0, 1), "x"),
            ContentChange::new(Range::from_coords(1, 1, 1, 2), "y"),
            ContentChange::new(Range::from_coords(2, 1, 2, 2), "z"),
        ]))
        .unwrap();
    assert_eq!(outcome.document.text(), "xbc\ndyf\nghz");
    assert_eq!(outcome.changes.len(), 3);
}

#[test]
fn test_sequential_batches_use_previous_state() {
    let mut registry = DocumentRegistry::default();
    registry
        .apply_update(UpdateMessage::new(URI).with_content("ab"))
        .unwrap();
    for (i, ch) in ["c", "d", "e"].into_iter().enumerate() {
        let column = 2 + i;
        registry
            .apply_update(UpdateMessage::new(URI).with_changes(vec![ContentChange::new(
                Range::from_coords(0, column, 0, column),
                ch,
            )]))
            .unwrap();
    }
    let document = registry.document(URI).unwrap();
    assert_eq!(document.text(), "abcde");
    assert_eq!(document.version(), 3);
}

#[test]
fn test_content_divergence_calls_handler_once_with_both_contents() {
    let (mut registry, seen) = collecting_registry(SyncConfig::default());
    registry
        .apply_update(UpdateMessage::new(URI).with_content("server side\n"))
        .unwrap();
    registry
        .apply_update(
            UpdateMessage::new(URI)
                .with_content("server side!\n")
                .with_testing(TestingMetadata {
                    source_of_truth: Some(GroundTruth {
                        content: Some("client side\n".to_string()),
                        selection: None,
                    }),
                    selected_text: None,
                }),
        )
        .unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    let report = seen[0].to_string();
    assert!(report.contains("client side"));
    assert!(report.contains("server side!"));
}

#[test]
fn test_matching_ground_truth_is_silent() {
    let (mut registry, seen) = collecting_registry(SyncConfig::default());
    let selection = Range::from_coords(0, 0, 0, 5);
    registry
        .apply_update(
            UpdateMessage::new(URI)
                .with_content("hello world")
                .with_selection(Some(selection))
                .with_testing(TestingMetadata {
                    source_of_truth: Some(GroundTruth {
                        content: Some("hello world".to_string()),
                        selection: Some(selection),
                    }),
                    selected_text: Some("hello".to_string()),
                }),
        )
        .unwrap();
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_verification_can_be_disabled() {
    let config = SyncConfig {
        verify_consistency: false,
        ..SyncConfig::default()
    };
    let (mut registry, seen) = collecting_registry(config);
    registry
        .apply_update(
            UpdateMessage::new(URI)
                .with_content("a")
                .with_testing(TestingMetadata {
                    source_of_truth: None,
                    selected_text: Some("not a".to_string()),
                }),
        )
        .unwrap();
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_unopened_file_is_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.txt");
    std::fs::write(&path, "from disk\r\nsecond\r\n").unwrap();
    let uri = agent_docs::uri::path_to_file_uri(&path);

    let mut registry = DocumentRegistry::default().with_content_provider(FileContentProvider);
    let document = registry.get_or_load(&uri);
    assert_eq!(document.text(), "from disk\r\nsecond\r\n");
    assert_eq!(document.read().eol(), agent_docs::LineEnding::Crlf);
    assert_eq!(document.read().line_at(0).text, "from disk");
    assert_eq!(document.read().file_name(), "seed.txt");
}

#[test]
fn test_missing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let uri = agent_docs::uri::path_to_file_uri(&dir.path().join("missing.txt"));

    let mut registry = DocumentRegistry::default();
    let outcome = registry.apply_update(UpdateMessage::new(&uri)).unwrap();
    assert_eq!(outcome.kind, UpdateKind::Opened);
    assert_eq!(outcome.document.text(), "");
}

#[test]
fn test_enumeration_and_visible_editors() {
    let mut registry = DocumentRegistry::default();
    registry
        .apply_update(UpdateMessage::new("file:///b.txt").with_content("b"))
        .unwrap();
    registry
        .apply_update(
            UpdateMessage::new("file:///a.txt")
                .with_content("a")
                .with_visible_range(Some(Range::from_coords(0, 0, 0, 1))),
        )
        .unwrap();

    assert_eq!(
        registry.uris(),
        vec!["file:///a.txt".to_string(), "file:///b.txt".to_string()]
    );
    assert_eq!(registry.documents().len(), 2);
    assert_eq!(registry.editors().len(), 2);
    let visible = registry.visible_editors();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].document().uri(), "file:///a.txt");
}
