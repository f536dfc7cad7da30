//! Behavioral tests for the buffer engine.
//!
//! Each test exercises the public `process` / `flush` / `stats` surface
//! against either a mock sink or a real file.

use buffer::{BufferConfig, Engine};
use integration_tests::{fixtures, setup};
use integration_tests::setup::TestContext;

/// Two engines built without an initial batch never share a buffer.
#[test]
fn test_engines_do_not_share_buffers() {
    let (first, _) = setup::mock_engine(100);
    let (second, _) = setup::mock_engine(100);

    assert!(first.process(serde_json::json!({"test": "data1"})));
    assert!(second.process(serde_json::json!({"test": "data2"})));

    assert_eq!(first.stats().buffer_size, 1);
    assert_eq!(second.stats().buffer_size, 1);
}

/// Non-mapping and empty candidates are rejected and counted.
#[test]
fn test_invalid_candidates_are_rejected() {
    let (engine, sink) = setup::mock_engine(1);

    for candidate in fixtures::invalid_candidates() {
        assert!(!engine.process(candidate));
    }

    let stats = engine.stats();
    assert_eq!(stats.total_errors, 4);
    assert_eq!(stats.total_processed, 0);
    assert_eq!(stats.buffer_size, 0);
    assert_eq!(sink.append_count(), 0);
}

/// Flushing an empty buffer returns 0 and never touches the sink.
#[test]
fn test_empty_flush_is_noop() {
    let (engine, sink) = setup::mock_engine(10);

    assert_eq!(engine.flush().unwrap(), 0);
    assert_eq!(sink.append_count(), 0);

    let ctx = TestContext::new();
    let engine = ctx.file_engine(10);
    assert_eq!(engine.flush().unwrap(), 0);
    assert!(!ctx.log_path.exists());
}

/// One unencodable event does not prevent the rest of its batch from
/// being written.
#[test]
fn test_partial_batch_encoding_failure() {
    let ctx = TestContext::new();
    let engine = ctx.file_engine(10);

    assert!(engine.process(fixtures::self_referential_event()));
    assert!(engine.process(fixtures::log_event("auth", "login")));
    let before = engine.stats();

    assert_eq!(engine.flush().unwrap(), 1);

    let after = engine.stats();
    assert_eq!(after.total_written, before.total_written + 1);
    assert_eq!(after.total_errors, before.total_errors + 1);
    assert_eq!(after.buffer_size, 0);

    let records = fixtures::read_records(&ctx.log_path);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["msg"], "login");
}

/// Non-finite floats are dropped the same way as cyclic structures.
#[test]
fn test_non_finite_float_is_dropped() {
    let (engine, sink) = setup::mock_engine(2);

    engine.process(fixtures::non_finite_event());
    engine.process(fixtures::log_event("metrics", "ok"));

    let stats = engine.stats();
    assert_eq!(stats.total_written, 1);
    assert_eq!(stats.total_errors, 1);
    assert_eq!(sink.record_count(), 1);
    assert_eq!(engine.flush_metrics().encode_failures, 1);
}

/// A failing sink returns the failure sentinel and keeps every event.
#[test]
fn test_sink_failure_restores_batch() {
    let (engine, sink) = setup::mock_engine(100);
    for event in fixtures::log_events(3) {
        engine.process(event);
    }
    sink.set_should_fail(true);

    let err = engine.flush().unwrap_err();
    assert_eq!(err.restored(), 3);

    let stats = engine.stats();
    assert_eq!(stats.total_written, 0);
    assert_eq!(stats.total_errors, 1);
    assert_eq!(stats.buffer_size, 3);
    assert_eq!(stats.in_flight, 0);

    // Retrying once the sink recovers writes everything exactly once.
    sink.set_should_fail(false);
    assert_eq!(engine.flush().unwrap(), 3);
    assert_eq!(sink.record_count(), 3);
    assert_eq!(engine.stats().total_written, 3);
    assert_eq!(engine.stats().buffer_size, 0);
}

/// Events restored after a failure stay ahead of events accepted later.
#[test]
fn test_retry_preserves_acceptance_order() {
    let (engine, sink) = setup::mock_engine(100);
    engine.process(fixtures::tagged_event(0, 0));
    engine.process(fixtures::tagged_event(0, 1));

    sink.set_should_fail(true);
    assert!(engine.flush().is_err());
    sink.set_should_fail(false);

    engine.process(fixtures::tagged_event(0, 2));
    assert_eq!(engine.flush().unwrap(), 3);

    let seqs: Vec<_> = sink
        .captured_json()
        .iter()
        .map(|r| r["seq"].as_u64().unwrap())
        .collect();
    assert_eq!(seqs, [0, 1, 2]);
}

/// Reaching the threshold flushes without an explicit `flush` call.
#[test]
fn test_auto_flush_on_threshold() {
    let ctx = TestContext::new();
    let engine = ctx.file_engine(2);

    assert!(engine.process(fixtures::log_event("auth", "login")));
    assert!(fixtures::read_records(&ctx.log_path).is_empty());
    assert!(engine.process(fixtures::log_event("auth", "logout")));

    let records = fixtures::read_records(&ctx.log_path);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["msg"], "login");
    assert_eq!(records[1]["msg"], "logout");

    let stats = engine.stats();
    assert_eq!(stats.buffer_size, 0);
    assert_eq!(stats.total_processed, 2);
    assert_eq!(stats.total_written, 2);
}

/// A failed threshold flush does not fail `process`; the next append
/// retries the whole batch.
#[test]
fn test_failed_auto_flush_retries_on_next_process() {
    let (engine, sink) = setup::mock_engine(2);
    sink.set_should_fail(true);

    assert!(engine.process(fixtures::log_event("auth", "a")));
    assert!(engine.process(fixtures::log_event("auth", "b")));
    assert_eq!(engine.stats().buffer_size, 2);
    assert_eq!(engine.stats().total_errors, 1);

    sink.set_should_fail(false);
    assert!(engine.process(fixtures::log_event("auth", "c")));

    let stats = engine.stats();
    assert_eq!(stats.buffer_size, 0);
    assert_eq!(stats.total_written, 3);
    assert_eq!(sink.append_count(), 2);
}

/// Repeated snapshots without intervening calls are identical.
#[test]
fn test_idle_stats_are_stable() {
    let (engine, _) = setup::mock_engine(10);
    assert_eq!(engine.stats(), engine.stats());

    engine.process(fixtures::log_event("auth", "login"));
    let first = engine.stats();
    let second = engine.stats();
    assert_eq!(first, second);
    assert_eq!(first.sink, "mock://sink");
}

/// Snapshots serialize with stable field names.
#[test]
fn test_stats_serialize() {
    let ctx = TestContext::new();
    let engine = ctx.file_engine(10);
    engine.process(fixtures::log_event("auth", "login"));

    let json = serde_json::to_value(engine.stats()).unwrap();
    assert_eq!(json["buffer_size"], 1);
    assert_eq!(json["total_processed"], 1);
    assert_eq!(json["total_written"], 0);
    assert_eq!(json["total_errors"], 0);
    assert_eq!(json["sink"], ctx.log_path.display().to_string());
}

/// Configuration errors surface at construction.
#[test]
fn test_invalid_config_rejected() {
    let ctx = TestContext::new();
    let config = BufferConfig::default()
        .with_flush_threshold(0)
        .with_sink_path(&ctx.log_path);

    let err = Engine::open(&config).unwrap_err();
    assert_eq!(err.error_code(), Some("CONFIG_002"));
}
