use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a [`ConnectionManager`](crate::ConnectionManager).
///
/// ```text
/// Unconnected -> Connecting -> Open -> Closing -> Closed
///                    \_____________________________/^
/// ```
///
/// `Closed` is terminal. Reconnecting requires a new manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Unconnected,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Unconnected, Connecting)
                | (Unconnected, Closed)
                | (Connecting, Open)
                | (Connecting, Closed)
                | (Open, Closing)
                | (Closing, Closed)
        )
    }

    /// `Closing` or `Closed`.
    pub fn is_terminating(self) -> bool {
        matches!(self, ConnectionState::Closing | ConnectionState::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Unconnected => "unconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
