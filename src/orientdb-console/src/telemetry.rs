//! File-based structured logging for the console
//!
//! - JSON formatted logs to a rolling file (daily, 10MB per file)
//! - Human-readable output on stderr so it never mixes with query results

use anyhow::Result;
use orientdb_core::config::LoggingConfig;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Initialize logging. The returned guard must stay alive for logs to flush.
pub fn init_telemetry(config: &LoggingConfig) -> Result<WorkerGuard> {
    let log_dir = Path::new(&config.log_dir);
    std::fs::create_dir_all(log_dir)?;

    // orientdb-console.log, rotated daily or at 10 MB, whichever comes first
    let file_appender = RollingFileAppender::new(
        log_dir.join("orientdb-console.log"),
        RollingConditionBasic::new()
            .daily()
            .max_size(10 * 1024 * 1024),
        9,
    )?;

    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::info!("Logging to {:?}", log_dir);

    Ok(guard)
}

pub fn shutdown_telemetry() {
    tracing::info!("Telemetry shutdown complete");
}
