//! Log buffer driver.
//!
//! Reads newline-delimited JSON events from stdin, buffers them, and
//! persists them in batches to an append-only log file. On end of input
//! or Ctrl+C the remaining events are flushed and final statistics are
//! printed as JSON.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use buffer::{start_flush_task, BufferConfig, Engine};
use engine_core::Value;
use parking_lot::Mutex;
use tokio::signal;
use tracing::{error, info, warn};

use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    buffer: BufferConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting log buffer v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        flush_threshold = config.buffer.flush_threshold,
        sink = %config.buffer.sink_path.display(),
        flush_interval_ms = config.buffer.flush_interval_ms,
        "Loaded buffer config"
    );

    let engine = Arc::new(Engine::open(&config.buffer).context("Failed to open log buffer")?);

    let flush_handle = config
        .buffer
        .flush_interval()
        .map(|interval| start_flush_task(engine.clone(), interval));

    // Held by the reader while it hands a line to the engine. Closing it
    // at shutdown waits out an in-progress `process` call.
    let intake = Arc::new(Mutex::new(true));

    let reader = {
        let engine = engine.clone();
        let intake = intake.clone();
        tokio::task::spawn_blocking(move || read_events(&engine, &intake))
    };

    let interrupted = tokio::select! {
        res = reader => {
            match res {
                Ok(Ok(lines)) => info!(lines, "End of input"),
                Ok(Err(e)) => error!("Failed to read input: {:#}", e),
                Err(e) => error!("Reader task failed: {}", e),
            }
            false
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C signal");
            true
        }
    };

    if let Some(handle) = flush_handle {
        handle.abort();
    }

    info!("Shutting down...");

    // Stop intake, then flush remaining events
    let final_flush = {
        let engine = engine.clone();
        tokio::task::spawn_blocking(move || {
            *intake.lock() = false;
            engine.flush_all()
        })
        .await
        .context("Final flush task failed")?
    };
    match final_flush {
        Ok(written) => info!(written, "Final flush complete"),
        Err(e) => error!("Final flush failed: {}", e),
    }

    let stats = engine.stats();
    if stats.unwritten() > 0 {
        warn!(unwritten = stats.unwritten(), "Events not persisted");
    }
    println!(
        "{}",
        serde_json::to_string(&stats).context("Failed to encode statistics")?
    );

    info!("Shutdown complete");

    // The stdin reader may still be parked in a blocking read, which would
    // keep the runtime from shutting down.
    if interrupted {
        std::process::exit(0);
    }
    Ok(())
}

/// Feeds stdin lines to the engine until end of input or until `intake`
/// is closed.
///
/// Lines that are not JSON are passed through as strings, so the engine
/// rejects and counts them like any other non-mapping event.
fn read_events<S: sink::SinkWriter>(engine: &Engine<S>, intake: &Mutex<bool>) -> Result<u64> {
    let stdin = std::io::stdin();
    let mut lines = 0;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }

        let candidate = serde_json::from_str::<serde_json::Value>(&line)
            .map(Value::from)
            .unwrap_or(Value::String(line));

        let open = intake.lock();
        if !*open {
            break;
        }
        engine.process(candidate);
        lines += 1;
    }

    Ok(lines)
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables, e.g. LOGBUF__BUFFER__FLUSH_THRESHOLD
        .add_source(
            config::Environment::with_prefix("LOGBUF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config
        .buffer
        .check()
        .context("Invalid buffer configuration")?;

    Ok(config)
}
