use serde::{Deserialize, Serialize};

/// Behaviour of `send` when the bounded outbound queue is full.
///
/// The policy is fixed per connection, so every call on one connection
/// observes the same behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Return [`StrataLinkError::Backpressure`](crate::StrataLinkError::Backpressure)
    /// immediately. The request is not registered and nothing is written.
    #[default]
    FailFast,
    /// Suspend the caller until the send task frees a slot.
    Block,
}
