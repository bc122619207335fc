//! Error types for server list parsing

use thiserror::Error;

/// Errors that abort parsing of a whole feed.
///
/// Individual malformed entries never produce a `ParseError`; they are
/// dropped by the reducer and counted in [`ParsedFeed::dropped_entries`].
///
/// [`ParsedFeed::dropped_entries`]: crate::ParsedFeed::dropped_entries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document is not well-formed XML
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: usize, message: String },

    /// The stream ended while elements were still open
    #[error("Unexpected end of document with {open_elements} unclosed element(s)")]
    UnexpectedEof { open_elements: usize },

    /// The stream contained no elements at all
    #[error("Document contains no elements")]
    EmptyDocument,

    /// Reading from the underlying stream failed
    #[error("Failed to read feed: {0}")]
    Io(String),

    /// The caller asked parsing to stop
    #[error("Parsing aborted")]
    Aborted,
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Reason a single `<server>` entry was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedEntry {
    #[error("missing required attribute `{0}`")]
    MissingAttribute(&'static str),

    #[error("invalid port `{0}`")]
    InvalidPort(String),

    #[error("no enclosing country")]
    NoCountry,

    #[error("no enclosing continent")]
    NoContinent,
}
