//! Error types for strata-link.
//!
//! Errors are `Clone` so a single teardown cause can be handed to every
//! call that was still waiting when the connection went away.

use thiserror::Error;

/// Result type for strata-link operations.
pub type Result<T> = std::result::Result<T, StrataLinkError>;

/// Errors produced by the driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrataLinkError {
    /// The WebSocket handshake failed or did not finish in time.
    #[error("Connection to {address} failed: {cause}")]
    Connection { address: String, cause: String },

    /// Socket read/write failure after the handshake succeeded.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered a call with an `error` object.
    #[error("RPC error{}: {message}", .code.map(|c| format!(" ({})", c)).unwrap_or_default())]
    Rpc { code: Option<i64>, message: String },

    /// The outbound queue is full and the connection uses the fail-fast policy.
    #[error("Outbound queue is full ({capacity} messages)")]
    Backpressure { capacity: usize },

    /// A frame, payload, or result could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The connection was closed before the call completed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A pending-call id was registered twice.
    #[error("Duplicate request id {0}")]
    DuplicateId(u64),

    /// Operation is not valid in the current lifecycle state.
    #[error("Invalid connection state: expected {expected}, found {actual}")]
    InvalidState { expected: String, actual: String },

    /// Invalid client configuration (URL, builder input).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A call did not receive its response within the configured timeout.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl StrataLinkError {
    /// Returns `true` if the error tore down (or found torn down) the whole
    /// connection rather than failing a single call.
    pub fn is_connection_wide(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::ConnectionClosed | Self::Connection { .. }
        )
    }
}

impl From<serde_json::Error> for StrataLinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
