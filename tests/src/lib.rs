//! Shared helpers for the log buffer integration tests.

pub mod fixtures;
