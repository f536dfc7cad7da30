//! End-to-end tests against the file sink.

use std::fs;

use buffer::{BufferConfig, Engine};
use integration_tests::fixtures;
use integration_tests::setup::TestContext;

/// Missing parent directories are created when the engine is opened.
#[test]
fn test_open_creates_directories() {
    let ctx = TestContext::new();
    let path = ctx.dir.path().join("nonexistent/subdir/logs.txt");
    let config = BufferConfig::default().with_sink_path(&path);

    let engine = Engine::open(&config).unwrap();
    assert!(path.parent().unwrap().is_dir());

    engine.process(fixtures::log_event("auth", "data"));
    assert_eq!(engine.flush().unwrap(), 1);
    assert!(path.exists());
}

/// Non-ASCII text is written as UTF-8, one record per line.
#[test]
fn test_records_are_utf8_lines() {
    let ctx = TestContext::new();
    let engine = ctx.file_engine(100);

    engine.process(serde_json::json!({"service": "auth", "msg": "Login con ñ y acentos: áéíóú"}));
    engine.process(serde_json::json!({"service": "auth", "msg": "Caracteres especiales: ñ á é í ó ú"}));
    assert_eq!(engine.flush().unwrap(), 2);

    let content = fs::read_to_string(&ctx.log_path).unwrap();
    assert!(content.contains("ñ"));
    assert!(content.ends_with('\n'));
    assert_eq!(content.lines().count(), 2);
    assert_eq!(
        content.lines().next().unwrap(),
        r#"{"service":"auth","msg":"Login con ñ y acentos: áéíóú"}"#
    );
}

/// Successive flushes append to the same file.
#[test]
fn test_flushes_append() {
    let ctx = TestContext::new();
    let engine = ctx.file_engine(100);

    for round in 0..3 {
        engine.process(fixtures::tagged_event(0, round));
        engine.flush().unwrap();
    }

    let records = fixtures::read_records(&ctx.log_path);
    let seqs: Vec<_> = records.iter().map(|r| r["seq"].as_u64().unwrap()).collect();
    assert_eq!(seqs, [0, 1, 2]);
}

/// A target that cannot be opened fails the flush and keeps the events.
#[test]
fn test_unwritable_target_restores_events() {
    let ctx = TestContext::new();
    let engine = ctx.file_engine(100);
    for event in fixtures::log_events(4) {
        engine.process(event);
    }

    // Occupy the log path with a directory so the append cannot open it.
    fs::create_dir_all(&ctx.log_path).unwrap();
    let err = engine.flush().unwrap_err();
    assert_eq!(err.error_code(), "SINK_002");
    assert_eq!(err.restored(), 4);

    let stats = engine.stats();
    assert_eq!(stats.buffer_size, 4);
    assert_eq!(stats.total_written, 0);
    assert_eq!(stats.total_errors, 1);

    fs::remove_dir(&ctx.log_path).unwrap();
    assert_eq!(engine.flush().unwrap(), 4);
    assert_eq!(fixtures::read_records(&ctx.log_path).len(), 4);
    assert_eq!(engine.flush_metrics().sink_failures, 1);
}
