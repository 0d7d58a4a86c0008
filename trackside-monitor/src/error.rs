//! Errors raised at the transport seam.

use thiserror::Error;
use trackside_core::TracksideError;

/// Errors from decoding payloads and wiring the engine up.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The payload was empty.
    #[error("Empty snapshot body")]
    EmptyBody,

    /// The payload exceeds the configured limit.
    #[error("Snapshot body of {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Payload size.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Neither MessagePack nor JSON could make sense of the payload.
    #[error("Undecodable snapshot (msgpack: {msgpack}; json: {json})")]
    Decode {
        /// MessagePack decoder error.
        msgpack: String,
        /// JSON decoder error.
        json: String,
    },

    /// Error from the engine (catalog loading, configuration).
    #[error(transparent)]
    Core(#[from] TracksideError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, MonitorError>;
