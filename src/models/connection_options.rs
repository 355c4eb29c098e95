use serde::{Deserialize, Serialize};

use super::backpressure_policy::BackpressurePolicy;

/// Connection-level options for the RPC WebSocket.
///
/// Separate from [`StrataLinkTimeouts`](crate::StrataLinkTimeouts), which
/// holds every duration-valued knob.
///
/// # Example
///
/// ```rust
/// use strata_link::{BackpressurePolicy, ConnectionOptions};
///
/// let options = ConnectionOptions::default()
///     .with_outbound_queue_capacity(1024)
///     .with_backpressure(BackpressurePolicy::Block);
/// assert_eq!(options.outbound_queue_capacity, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionOptions {
    /// Capacity of the bounded outbound queue drained by the send task.
    /// Default: 256
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,

    /// What `send` does when the outbound queue is full.
    /// Default: [`BackpressurePolicy::FailFast`]
    #[serde(default)]
    pub backpressure: BackpressurePolicy,

    /// Capacity of the per-subscription channel used by stream-style
    /// live queries. When full, the receive task waits for the consumer.
    /// Default: 8192
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Inbound frames larger than this are dropped with a warning.
    /// Default: 64 MiB
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Path of the RPC endpoint appended to `http(s)://` base URLs.
    /// Default: `/rpc`
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
}

fn default_outbound_queue_capacity() -> usize {
    256
}

fn default_event_channel_capacity() -> usize {
    8192
}

fn default_max_message_bytes() -> usize {
    64 << 20
}

fn default_rpc_path() -> String {
    "/rpc".to_string()
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_outbound_queue_capacity(),
            backpressure: BackpressurePolicy::default(),
            event_channel_capacity: default_event_channel_capacity(),
            max_message_bytes: default_max_message_bytes(),
            rpc_path: default_rpc_path(),
        }
    }
}

impl ConnectionOptions {
    /// Create new connection options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outbound queue capacity (minimum 1).
    pub fn with_outbound_queue_capacity(mut self, capacity: usize) -> Self {
        self.outbound_queue_capacity = capacity.max(1);
        self
    }

    /// Set the back-pressure policy for `send`.
    pub fn with_backpressure(mut self, policy: BackpressurePolicy) -> Self {
        self.backpressure = policy;
        self
    }

    /// Set the per-subscription channel capacity (minimum 1).
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the inbound frame size limit.
    pub fn with_max_message_bytes(mut self, bytes: usize) -> Self {
        self.max_message_bytes = bytes;
        self
    }

    /// Set the RPC endpoint path.
    pub fn with_rpc_path(mut self, path: impl Into<String>) -> Self {
        self.rpc_path = path.into();
        self
    }
}
