//! Integration tests for the buffered file sink
//!
//! These tests verify:
//! - Program-order delivery across the stream-opening window
//! - Log directory listing and reading
//! - Destroy semantics and explicit retry after a failed open

#![cfg(feature = "file")]

use axe_logger::prelude::*;
use axe_logger::{FileSinkConfig, LogFileInfo};
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn message_of(line: &str) -> &str {
    line.split_once("]  ").map(|(_, message)| message).unwrap_or("")
}

#[test]
fn test_lines_before_and_after_ready_keep_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = LogManager::new();
    let sink = manager
        .add_sink(
            FileSink::builder()
                .log_dir(temp_dir.path())
                .min_level(Severity::Verbose)
                .open_on_create(false)
                .filename_fn(|| "ordered.txt".to_string())
                .build()
                .expect("Failed to create sink"),
        )
        .unwrap();
    let logger = manager.create_logger(Some("order"));

    const N: usize = 20;
    const M: usize = 30;
    for i in 0..N {
        logger.log(("before", i));
    }
    assert!(sink.wait_until_ready(WAIT), "stream never became ready");
    for i in 0..M {
        logger.log(("after", i));
    }
    assert_eq!(sink.pending_len(), 0);

    assert!(manager.remove_sink(&sink));

    let content = sink.read_log_file("ordered.txt").unwrap();
    let messages: Vec<&str> = content.lines().map(message_of).collect();
    let expected: Vec<String> = (0..N)
        .map(|i| format!("before {}", i))
        .chain((0..M).map(|i| format!("after {}", i)))
        .collect();
    assert_eq!(messages, expected);
}

#[test]
fn test_line_format() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let sink = FileSink::builder()
        .log_dir(temp_dir.path())
        .filename_fn(|| "format.txt".to_string())
        .build()
        .unwrap();
    assert!(sink.wait_until_ready(WAIT));

    let manager = LogManager::new();
    let sink = manager.add_sink(sink).unwrap();
    let logger = manager.create_logger(Some("fmt"));
    logger.warn("disk at 91%");
    logger.verbose("filtered by the sink's default level");
    logger.error("multi\nline");
    sink.destroy();

    let content = sink.read_log_file("format.txt").unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("  WARN   [fmt]  disk at 91%"), "{}", lines[0]);
    assert!(lines[1].ends_with("  ERROR  [fmt]  multi\\nline"), "{}", lines[1]);
    assert!(content.ends_with('\n'));
}

#[test]
fn test_list_log_files_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let sink = FileSink::new(temp_dir.path()).unwrap();
    assert!(sink.wait_until_ready(WAIT));

    sink.write_line("hello\n");
    let path = sink.current_path().unwrap();
    assert!(sink.close(WAIT));

    let files: Vec<LogFileInfo> = sink.list_log_files().unwrap();
    assert_eq!(files.len(), 1);
    let file = &files[0];
    assert_eq!(file.filename, path.file_name().unwrap().to_str().unwrap());
    assert!(file.filename.ends_with(".txt"));
    assert!(!file.filename.contains(':'));
    assert!(file.size > 0);
    assert!(file.modified_epoch_ms >= file.created_epoch_ms);

    assert_eq!(sink.read_log_file(&file.filename).unwrap(), "hello\n");
}

#[test]
fn test_list_log_files_sorted() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    for name in ["b.txt", "a.txt", "c.txt"] {
        fs::write(temp_dir.path().join(name), name).unwrap();
    }
    fs::create_dir(temp_dir.path().join("archive")).unwrap();

    let sink = FileSink::builder()
        .log_dir(temp_dir.path())
        .open_on_create(false)
        .build()
        .unwrap();

    let names: Vec<String> = sink
        .list_log_files()
        .unwrap()
        .into_iter()
        .map(|f| f.filename)
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
}

#[test]
fn test_read_while_writing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let sink = FileSink::builder()
        .log_dir(temp_dir.path())
        .filename_fn(|| "live.txt".to_string())
        .build()
        .unwrap();
    assert!(sink.wait_until_ready(WAIT));

    sink.write_line("one\n");
    // Readable before close; content may lag the writer
    let partial = sink.read_log_file("live.txt").unwrap();
    assert!(partial.is_empty() || partial == "one\n");

    sink.destroy();
    assert_eq!(sink.read_log_file("live.txt").unwrap(), "one\n");
}

#[test]
fn test_read_log_file_errors() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let sink = FileSink::builder()
        .log_dir(temp_dir.path())
        .open_on_create(false)
        .build()
        .unwrap();

    assert!(matches!(
        sink.read_log_file("../etc/passwd"),
        Err(LoggerError::InvalidFileName { .. })
    ));
    assert!(matches!(
        sink.read_log_file("missing.txt"),
        Err(LoggerError::IoOperation { .. })
    ));
}

#[test]
fn test_directory_created_recursively() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("a/b/c");
    let sink = FileSink::new(&log_dir).unwrap();

    assert!(sink.wait_until_ready(WAIT));
    assert!(log_dir.is_dir());
    assert_eq!(sink.log_dir(), log_dir.as_path());
}

#[test]
fn test_destroy_is_idempotent() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = LogManager::new();
    let sink = manager.add_sink(FileSink::new(temp_dir.path()).unwrap()).unwrap();
    assert!(sink.wait_until_ready(WAIT));

    sink.destroy();
    sink.destroy();
    assert_eq!(sink.state(), StreamState::Closed);

    manager.create_logger(None).error("after destroy");
    assert!(sink.current_path().is_none());
    assert_eq!(sink.pending_len(), 0);

    // Removing it from the manager destroys it once more
    assert!(manager.remove_sink(&sink));
    assert_eq!(sink.state(), StreamState::Closed);
}

#[test]
fn test_failed_open_holds_sink_not_ready_until_retry() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocked = temp_dir.path().join("blocked");
    fs::write(&blocked, "a file where the log directory should be").unwrap();

    let sink = FileSink::builder()
        .log_dir(&blocked)
        .filename_fn(|| "retry.txt".to_string())
        .on_event(|_| {})
        .build()
        .unwrap();

    assert!(!sink.wait_until_ready(WAIT));
    assert_eq!(sink.state(), StreamState::Failed);
    sink.write_line("held\n");
    assert_eq!(sink.pending_len(), 1);

    // Still failed: no automatic retry
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(sink.state(), StreamState::Failed);

    fs::remove_file(&blocked).unwrap();
    sink.open_new_file().unwrap();
    assert!(sink.wait_until_ready(WAIT));
    sink.write_line("fresh\n");
    sink.destroy();

    assert_eq!(sink.read_log_file("retry.txt").unwrap(), "held\nfresh\n");
}

#[test]
fn test_from_json_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let json = format!(
        r#"{{ "name": "audit", "min_level": "error", "log_dir": {}, "open_on_create": false }}"#,
        serde_json::to_string(temp_dir.path()).unwrap()
    );
    let config: FileSinkConfig = serde_json::from_str(&json).unwrap();
    let sink = FileSink::from_config(config).unwrap();

    assert_eq!(sink.name(), "audit");
    assert_eq!(sink.min_level(), Severity::Error);
    assert_eq!(sink.state(), StreamState::NoStream);
}

#[test]
fn test_remove_sink_whose_events_log_through_manager() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = LogManager::new();
    let events = manager.add_sink(ObservableSink::new()).unwrap().subscribe();
    let reporter = manager.create_logger(Some("file-events"));

    let sink = manager
        .add_sink(
            FileSink::builder()
                .log_dir(temp_dir.path())
                .on_event(move |event| reporter.warn(format!("{:?}", event)))
                .build()
                .unwrap(),
        )
        .unwrap();
    assert!(sink.wait_until_ready(WAIT));

    let start = Instant::now();
    assert!(manager.remove_sink(&sink));
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "removal waited {:?}",
        start.elapsed()
    );

    let messages: Vec<String> = events
        .try_iter()
        .map(|r| r.message().to_string())
        .collect();
    assert!(
        messages.iter().any(|m| m.starts_with("Closed")),
        "{:?}",
        messages
    );
}

#[test]
fn test_destroy_before_ready_loses_backlog() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocked = temp_dir.path().join("blocked");
    fs::write(&blocked, "a file where the log directory should be").unwrap();

    let sink = FileSink::builder()
        .log_dir(&blocked)
        .filename_fn(|| "never.txt".to_string())
        .on_event(|_| {})
        .build()
        .unwrap();
    assert!(!sink.wait_until_ready(WAIT));

    sink.write_line("buffered 1\n");
    sink.write_line("buffered 2\n");
    assert_eq!(sink.pending_len(), 2);

    sink.destroy();
    assert_eq!(sink.pending_len(), 0);
    assert_eq!(sink.state(), StreamState::Closed);

    // The backlog is gone for good: the sink cannot be reopened
    fs::remove_file(&blocked).unwrap();
    assert!(sink.open_new_file().is_err());
    assert!(!blocked.join("never.txt").exists());
}
