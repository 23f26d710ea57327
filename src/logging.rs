use anyhow::{Context, Result};
use std::fs::OpenOptions;
use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
pub struct LogGuard(tracing_appender::non_blocking::WorkerGuard);

/// Initialize debug logging.
///
/// When `debug` is enabled, logs are appended to `searxngr-debug.log`
/// next to the config file; the interactive prompt stays clean either
/// way. When `debug` is disabled, this is a no-op.
pub fn init(debug: bool) -> Result<Option<LogGuard>> {
    if !debug {
        return Ok(None);
    }

    let log_path = crate::config::config_path()?.with_file_name("searxngr-debug.log");

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    // Default: debug our crate, warn for everything else.
    let filter = EnvFilter::try_new("searxngr=debug,warn").unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // If already initialized (e.g., in tests), don't crash.

    tracing::info!("debug logging enabled");
    tracing::info!(log_file = %log_path.display(), "writing logs to file");

    Ok(Some(LogGuard(guard)))
}
