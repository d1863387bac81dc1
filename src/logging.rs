//! Tracing configuration and log routing.
//!
//! Console logs always go to stderr because stdout carries the MCP stream when the stdio
//! transport is active. When `LOG_FILE` is set, a copy of every event is appended to that path
//! through a non‑blocking writer. The subscriber is built from [`LogSettings`] and installed
//! once by the binary; library code only emits events.
use std::fs::OpenOptions;
use std::io;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::config::{LogFormat, LogSettings};

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The configured log file could not be opened for appending.
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        /// Path taken from `LOG_FILE`.
        path: String,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The log level directive could not be parsed.
    #[error("invalid log level directive '{directive}': {reason}")]
    InvalidDirective {
        /// Directive taken from `LOG_LEVEL`.
        directive: String,
        /// Parser explanation.
        reason: String,
    },
    /// A global subscriber was already installed.
    #[error("tracing subscriber already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Keeps the non‑blocking file writer alive; drop it only when the process is exiting.
#[must_use = "dropping the guard stops the file writer"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Build and install the tracing subscriber described by `settings`.
///
/// - `RUST_LOG` takes precedence over `LOG_LEVEL` when present.
/// - Console output is compact text or JSON according to `LOG_FORMAT`.
/// - A file layer without ANSI colors is added when `LOG_FILE` is configured.
pub fn init_tracing(settings: &LogSettings) -> Result<LoggingGuard, LoggingError> {
    let env_filter = build_filter(settings)?;

    let console_layer = match settings.format {
        LogFormat::Text => fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .compact()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(false)
            .json()
            .boxed(),
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![console_layer];
    let mut file_guard = None;

    if let Some(path) = &settings.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LoggingError::OpenFile {
                path: path.display().to_string(),
                source,
            })?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact()
                .boxed(),
        );
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|err| LoggingError::AlreadyInitialized(err.to_string()))?;

    Ok(LoggingGuard { _file: file_guard })
}

fn build_filter(settings: &LogSettings) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.level).map_err(|err| LoggingError::InvalidDirective {
        directive: settings.level.clone(),
        reason: err.to_string(),
    })
}
