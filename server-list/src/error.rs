//! Error types for loading and querying the server list.

use server_list_parser::ParseError;
use thiserror::Error;

/// Why a load did not produce a model.
///
/// Exactly one of these reaches the delegate per failed load. Retrying is
/// left to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Connection, DNS or body read failure
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("Server responded with HTTP {0}")]
    HttpStatus(u16),

    /// The request did not finish within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The body was not a well-formed server list
    #[error("Invalid server list: {0}")]
    Parse(ParseError),

    /// A load is already in flight
    #[error("A load is already in progress")]
    AlreadyLoading,

    /// The load was cancelled before it finished
    #[error("Load cancelled")]
    Cancelled,

    /// Loader configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The background worker could not be started
    #[error("Failed to start loader thread: {0}")]
    Spawn(String),
}

impl LoadError {
    /// Transport-level failure (as opposed to a bad document).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            LoadError::Network(_) | LoadError::HttpStatus(_) | LoadError::Timeout
        )
    }
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        match err {
            // A read failure mid-body is a transport problem, not a bad document
            ParseError::Io(message) => LoadError::Network(message),
            ParseError::Aborted => LoadError::Cancelled,
            other => LoadError::Parse(other),
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LoadError::Timeout
        } else if let Some(status) = err.status() {
            LoadError::HttpStatus(status.as_u16())
        } else {
            LoadError::Network(err.to_string())
        }
    }
}

/// An accessor was called with an index outside the current model.
///
/// This signals that the UI and the model have drifted apart; callers should
/// treat it as a bug rather than an empty value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("Continent index {index} out of range (count {count})")]
    Continent { index: usize, count: usize },

    #[error("Country index {index} out of range for continent {continent} (count {count})")]
    Country {
        continent: usize,
        index: usize,
        count: usize,
    },
}

/// Invalid loader configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("Invalid environment variable {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}
