//! Test fixtures and event generators.

use std::path::Path;

use engine_core::{Fields, SharedMap, Value};
use uuid::Uuid;

/// Generate a valid log event with a unique ID.
pub fn log_event(service: &str, msg: &str) -> serde_json::Value {
    serde_json::json!({
        "id": Uuid::new_v4().to_string(),
        "service": service,
        "msg": msg,
        "level": "info"
    })
}

/// Generate N valid log events.
pub fn log_events(n: usize) -> Vec<serde_json::Value> {
    (0..n).map(|i| log_event("auth", &format!("event {}", i))).collect()
}

/// Generate a valid event tagged with a producer and sequence number.
pub fn tagged_event(producer: usize, seq: usize) -> serde_json::Value {
    serde_json::json!({
        "producer": producer,
        "seq": seq,
        "id": Uuid::new_v4().to_string()
    })
}

/// Generate an event that contains a reference to itself.
pub fn self_referential_event() -> Value {
    let map = SharedMap::new();
    map.insert("service", "auth");
    map.insert("self", map.clone());
    Value::Shared(map)
}

/// Generate an event with a float JSON cannot represent.
pub fn non_finite_event() -> Value {
    let mut fields = Fields::new();
    fields.insert("service", "metrics");
    fields.insert("ratio", f64::NAN);
    Value::Map(fields)
}

/// Candidates that are not non-empty mappings.
pub fn invalid_candidates() -> Vec<Value> {
    vec![
        Value::Null,
        Value::from("a string"),
        Value::from(42),
        Value::Map(Fields::new()),
    ]
}

/// Read a newline-delimited JSON file back into values.
pub fn read_records(path: &Path) -> Vec<serde_json::Value> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|line| serde_json::from_str(line).expect("record is valid JSON"))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => panic!("failed to read {}: {}", path.display(), e),
    }
}
