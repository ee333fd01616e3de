//! Logging initialization for quarry binaries
//!
//! Provides consistent `tracing` setup with JSON or human-readable output,
//! optional rotating log files and `RUST_LOG` overrides.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the non-blocking file writer flushing; hold it for the program's lifetime.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize logging from configuration.
///
/// Console output goes to stderr so stdout stays free for command output.
/// `RUST_LOG`, when set, replaces the configured level filter entirely.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let mut layers = vec![format_layer(config.json, true, std::io::stderr)];

    let file_guard = if config.file_enabled {
        let (writer, guard) = file_writer(config)?;
        layers.push(format_layer(config.json, false, writer));
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(build_env_filter(&config.level))
        .try_init()?;

    tracing::debug!(
        json = config.json,
        file_enabled = config.file_enabled,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Env-only logging for tools and tests that have no configuration.
pub fn init_simple_logging() {
    let _ = tracing_subscriber::registry()
        .with(format_layer(false, true, std::io::stderr))
        .with(build_env_filter("info"))
        .try_init();
}

fn format_layer<W>(json: bool, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    if json {
        layer
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed()
    } else {
        layer.boxed()
    }
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Quarry crates at `level`; sqlx statement logging kept quiet.
fn default_directives(level: &str) -> String {
    format!("quarry={level},quarry_fulltext={level},sqlx=warn")
}

/// Unknown rotation names fall back to daily.
fn rotation(name: &str) -> Rotation {
    match name {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn file_writer(
    config: &LoggingConfig,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&config.file_directory)?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation(&config.file_rotation))
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .build(&config.file_directory)?;

    Ok(tracing_appender::non_blocking(appender))
}
