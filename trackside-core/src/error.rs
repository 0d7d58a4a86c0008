//! Error types for the trackside engine.
//!
//! Only programmer errors and broken static assets surface here. Malformed
//! or missing snapshot data is never an error: the extractor defaults it.

use thiserror::Error;

/// Top-level error type for all trackside core operations.
#[derive(Error, Debug)]
pub enum TracksideError {
    /// The calendar was asked about a turn before the first one.
    #[error("Invalid turn: {0} (turns start at 1)")]
    InvalidTurn(u32),

    /// A catalog asset is structurally wrong (bad index key, unknown discipline, ...).
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A pattern rule carries a regular expression that does not compile.
    #[error("Invalid event pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Why the regex engine rejected it.
        #[source]
        source: regex::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for TracksideError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, TracksideError>;
