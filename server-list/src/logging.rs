//! Logging setup for applications embedding the loader
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the application. These helpers cover the common cases.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber; events are discarded
    Silent,
    /// Compact stderr output
    Development,
    /// Verbose output with thread ids and source locations
    Debug,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid log filter `{0}`")]
    InvalidFilter(String),
}

/// Install a global subscriber for `mode`.
///
/// # Environment Variables
///
/// - `SERVER_LIST_LOG_LEVEL`: filter directive (e.g. `debug`, `server_list=trace`)
/// - `RUST_LOG`: used when `SERVER_LIST_LOG_LEVEL` is not set
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    init_logging_with_level(mode, None)
}

/// Like [`init_logging`], with an explicit filter directive that takes
/// precedence over the environment.
pub fn init_logging_with_level(mode: LoggingMode, level: Option<&str>) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let filter = create_env_filter("info", level)?;

            Registry::default()
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_writer(std::io::stderr)
                        .compact(),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let filter = create_env_filter("debug", level)?;

            Registry::default()
                .with(
                    fmt::layer()
                        .pretty()
                        .with_thread_ids(true)
                        .with_thread_names(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Install a subscriber chosen by `SERVER_LIST_LOG_MODE`
/// (`silent`, `development`, `debug`). Defaults to silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = mode_from_str(std::env::var("SERVER_LIST_LOG_MODE").as_deref().unwrap_or(""));
    init_logging(mode)
}

/// Parse a mode name; unknown names mean [`LoggingMode::Silent`].
pub fn mode_from_str(name: &str) -> LoggingMode {
    match name.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => LoggingMode::Development,
        "debug" => LoggingMode::Debug,
        _ => LoggingMode::Silent,
    }
}

/// Build a filter from `level`, then `SERVER_LIST_LOG_LEVEL`, then `RUST_LOG`,
/// then `default_level`
fn create_env_filter(default_level: &str, level: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let directive = match level {
        Some(level) => level.to_string(),
        None => std::env::var("SERVER_LIST_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_level.to_string()),
    };

    EnvFilter::try_new(&directive).map_err(|_| LoggingError::InvalidFilter(directive))
}

/// Whether a global subscriber has already been installed.
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
