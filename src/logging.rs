//! Logging initialization for filestash.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Parse log level string to tracing Level.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Targets capped at warn unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: &[&str] = &["sqlx", "hyper", "h2"];

/// Build the filter from the configured level and any `RUST_LOG` directives.
///
/// Query logging from sqlx and connection chatter from hyper are only
/// shown when `RUST_LOG` is set.
fn build_filter(level: Level, env_directives: Option<&str>) -> EnvFilter {
    match env_directives.filter(|d| !d.trim().is_empty()) {
        Some(directives) => EnvFilter::builder()
            .parse_lossy(directives)
            .add_directive(level.into()),
        None => QUIET_TARGETS
            .iter()
            .filter_map(|target| format!("{target}=warn").parse().ok())
            .fold(EnvFilter::default().add_directive(level.into()), |filter, directive| {
                filter.add_directive(directive)
            }),
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(parse_level(level), env_directives.as_deref())
}

/// Initialize logging to stdout and to the configured log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(&config.level);

    if let Some(parent) = Path::new(&config.file).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    // Append so restarts keep the previous run's log.
    let log_file = File::options()
        .create(true)
        .append(true)
        .open(&config.file)?;
    let writer = std::io::stdout.and(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .init();

    Ok(())
}

/// Initialize console-only logging.
pub fn init_console_only(level: &str) {
    let filter = env_filter(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(true),
        )
        .with(filter)
        .init();
}
