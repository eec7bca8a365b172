use editor_core::events::ChunkEvent;
use editor_state::config::{Config, LoadStrategy};
use editor_state::document::{Document, SessionState, SessionUpdate};
use editor_state::errors::SessionError;

const WAIT: std::time::Duration = std::time::Duration::from_secs(20);

fn streamed_config() -> Config {
    Config {
        yield_between_chunks_ms: 0,
        ..Config::default()
    }
}

/// Every non-empty file takes the indexed path.
fn indexed_config() -> Config {
    Config {
        large_file_threshold_bytes: 0,
        ..streamed_config()
    }
}

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn all_lines(doc: &mut Document) -> Vec<String> {
    let count = doc.line_count().expect("document loaded");
    (0..count).map(|i| doc.get_line(i).unwrap()).collect()
}

fn chunks(updates: &[SessionUpdate]) -> Vec<&ChunkEvent> {
    updates
        .iter()
        .filter_map(|u| match u {
            SessionUpdate::Chunk(chunk) => Some(chunk),
            _ => None,
        })
        .collect()
}

fn sample_text() -> String {
    (0..20_000)
        .map(|i| format!("{i:05} ünïcödé line with some padding 日本語\n"))
        .collect::<String>()
        + "last line without terminator"
}

#[test]
fn test_streamed_load_assembles_buffer_from_ordered_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let text = sample_text();
    let path = write_file(&dir, "doc.txt", text.as_bytes());
    let mut doc = Document::new(streamed_config());

    assert_eq!(doc.load(&path).unwrap(), LoadStrategy::Streamed);
    assert_eq!(doc.state(), SessionState::Streaming);

    let updates = doc.wait_ready(WAIT);
    let chunks = chunks(&updates);

    assert_eq!(doc.state(), SessionState::Ready);
    assert!(chunks.len() > 1);
    assert!(chunks.windows(2).all(|w| w[0].percent <= w[1].percent));
    assert_eq!(chunks.last().unwrap().percent, 100);
    assert_eq!(chunks.iter().map(|c| c.text.as_str()).collect::<String>(), text);
    assert_eq!(
        updates.last(),
        Some(&SessionUpdate::Ready {
            line_count: 20_001
        })
    );
    assert_eq!(doc.buffer().unwrap().as_str(), text);
    assert_eq!(doc.progress(), 100);
}

#[test]
fn test_indexed_load_serves_lines() {
    let dir = tempfile::tempdir().unwrap();
    let text = sample_text();
    let path = write_file(&dir, "big.txt", text.as_bytes());
    let mut doc = Document::new(indexed_config());

    assert_eq!(doc.load(&path).unwrap(), LoadStrategy::Indexed);
    assert_eq!(doc.state(), SessionState::Indexing);

    let updates = doc.wait_ready(WAIT);

    assert_eq!(doc.state(), SessionState::Ready);
    assert!(matches!(
        updates.iter().rev().nth(1),
        Some(SessionUpdate::IndexProgress { percent: 100 })
    ));
    assert_eq!(doc.line_count(), Some(20_001));
    assert_eq!(doc.get_line(20_000).unwrap(), "last line without terminator");
    assert_eq!(all_lines(&mut doc).join("\n"), text);
}

#[test]
fn test_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "empty.txt", b"");
    let mut doc = Document::new(streamed_config());

    doc.load(&path).unwrap();
    let updates = doc.wait_ready(WAIT);

    assert_eq!(
        chunks(&updates),
        vec![&ChunkEvent {
            text: String::new(),
            percent: 100
        }]
    );
    assert_eq!(doc.line_count(), Some(1));
    assert_eq!(doc.get_line(0).unwrap(), "");
}

#[test]
fn test_single_terminator_on_both_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "nl.txt", b"\n");

    for config in [streamed_config(), indexed_config()] {
        let mut doc = Document::new(config);

        doc.load(&path).unwrap();
        doc.wait_ready(WAIT);

        assert_eq!(all_lines(&mut doc), vec!["", ""]);
    }
}

#[test]
fn test_invalid_utf8_fails_and_resets() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = b"fine\nfine\n".to_vec();
    bytes.extend_from_slice(b"\xFF\xFE broken");
    let path = write_file(&dir, "bad.txt", &bytes);

    for config in [streamed_config(), indexed_config()] {
        let mut doc = Document::new(config);

        doc.load(&path).unwrap();
        let updates = doc.wait_ready(WAIT);

        assert_eq!(doc.state(), SessionState::Failed);
        assert!(matches!(
            updates.last(),
            Some(SessionUpdate::Failed { reason }) if reason.contains("byte 10")
        ));
        assert!(doc.last_error().is_some());
        assert!(doc.buffer().is_none(), "partial buffer must be discarded");

        // A failed session is discarded, never resumed.
        assert!(matches!(doc.load(&path), Err(SessionError::InvalidState { .. })));
        doc.reset().unwrap();
        assert_eq!(doc.state(), SessionState::Unloaded);
        assert_eq!(doc.last_error(), None);
    }
}

#[cfg(target_os = "linux")]
fn open_handles_to(path: &std::path::Path) -> usize {
    let path = std::fs::canonicalize(path).unwrap();

    std::fs::read_dir("/proc/self/fd")
        .unwrap()
        .filter_map(|entry| std::fs::read_link(entry.ok()?.path()).ok())
        .filter(|target| *target == path)
        .count()
}

#[test]
fn test_cancel_mid_stream_returns_to_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    // 4 MB -> 20000-byte chunks, 200 of them, with a 5 ms pause between each.
    let path = write_file(&dir, "slow.txt", &vec![b'x'; 4_000_000]);
    let mut doc = Document::new(Config {
        yield_between_chunks_ms: 5,
        ..Config::default()
    });

    doc.load(&path).unwrap();

    let deadline = std::time::Instant::now() + WAIT;
    while chunks(&doc.poll()).is_empty() {
        assert!(std::time::Instant::now() < deadline, "no chunk arrived");
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    assert!(doc.cancel());
    assert_eq!(doc.state(), SessionState::Unloaded);
    assert!(doc.buffer().is_none());
    assert!(doc.poll().is_empty(), "queued events must be discarded");

    #[cfg(target_os = "linux")]
    assert_eq!(open_handles_to(&path), 0);

    // The slot is reusable after cancellation.
    doc.load(&path).unwrap();
    doc.wait_ready(WAIT);
    assert_eq!(doc.state(), SessionState::Ready);
}

#[test]
fn test_cancel_while_indexing_returns_to_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "huge.txt", &b"0123456789abcde\n".repeat(250_000));
    // A single-slot queue that is never drained keeps the indexer blocked mid-file.
    let mut doc = Document::new(Config {
        index_block_size: 4096,
        event_queue_capacity: 1,
        ..indexed_config()
    });

    assert_eq!(doc.load(&path).unwrap(), LoadStrategy::Indexed);
    assert_eq!(doc.state(), SessionState::Indexing);

    assert!(doc.cancel());
    assert_eq!(doc.state(), SessionState::Unloaded);
    assert_eq!(doc.line_count(), None);
    assert!(doc.poll().is_empty());

    #[cfg(target_os = "linux")]
    assert_eq!(open_handles_to(&path), 0);

    doc.load(&path).unwrap();
    doc.wait_ready(WAIT);
    assert_eq!(doc.line_count(), Some(250_001));
}

#[test]
fn test_close_releases_store_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "big.txt", b"a\nb\nc\n");
    let mut doc = Document::new(indexed_config());

    doc.load(&path).unwrap();
    doc.wait_ready(WAIT);

    #[cfg(target_os = "linux")]
    assert_eq!(open_handles_to(&path), 1);

    doc.close();
    assert_eq!(doc.state(), SessionState::Unloaded);
    assert_eq!(doc.line_count(), None);

    #[cfg(target_os = "linux")]
    assert_eq!(open_handles_to(&path), 0);
}

#[test]
fn test_indexed_documents_are_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "big.txt", b"line\n");
    let mut doc = Document::new(indexed_config());

    doc.load(&path).unwrap();
    doc.wait_ready(WAIT);

    assert!(matches!(doc.edit(|buf| buf.insert(0, "x")), Err(SessionError::ReadOnly)));
    assert!(matches!(doc.save(), Err(SessionError::ReadOnly)));
    assert_eq!(doc.state(), SessionState::Ready);
}

#[test]
fn test_save_round_trip_through_both_strategies() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "doc.txt", "héllo\nwörld".as_bytes());
    let mut doc = Document::new(streamed_config());

    doc.load(&path).unwrap();
    doc.wait_ready(WAIT);
    doc.edit(|buf| {
        buf.push_str("\n😀 appended\n");
        buf.replace(0..1, "H").map(|_| ())
    })
    .unwrap();

    let expected = "Héllo\nwörld\n😀 appended\n";
    assert_eq!(doc.buffer().unwrap().as_str(), expected);
    doc.save().unwrap();

    for config in [streamed_config(), indexed_config()] {
        let mut reloaded = Document::new(config);

        reloaded.load(&path).unwrap();
        reloaded.wait_ready(WAIT);

        assert_eq!(all_lines(&mut reloaded).join("\n"), expected);
    }
}

#[test]
fn test_save_as_moves_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "doc.txt", b"content");
    let copy = dir.path().join("copy.txt");
    let mut doc = Document::new(streamed_config());

    doc.load(&path).unwrap();
    doc.wait_ready(WAIT);
    doc.save_as(&copy).unwrap();

    assert_eq!(doc.path(), Some(copy.as_path()));
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), "content");
}

#[test]
fn test_failed_save_keeps_edits_and_editing_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "doc.txt", b"original");
    let mut doc = Document::new(streamed_config());

    doc.load(&path).unwrap();
    doc.wait_ready(WAIT);
    doc.edit(|buf| buf.insert(0, "edited ")).unwrap();

    let unwritable = dir.path().join("missing_dir").join("doc.txt");
    let err = doc.save_as(&unwritable).unwrap_err();

    assert!(matches!(err, SessionError::Write(_)));
    assert_eq!(doc.state(), SessionState::Editing);
    assert!(doc.last_error().is_some());
    assert!(doc.is_dirty());
    assert_eq!(doc.buffer().unwrap().as_str(), "edited original");
    assert_eq!(doc.path(), Some(path.as_path()));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");

    // Retrying against the real path succeeds with the edits intact.
    doc.save().unwrap();
    assert_eq!(doc.state(), SessionState::Ready);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "edited original");
}
