//! Subscription metadata exposed to callers.

use serde::{Deserialize, Serialize};

/// Read-only snapshot of one entry in the subscription table.
///
/// Returned by [`ConnectionManager::subscriptions()`](crate::ConnectionManager::subscriptions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// Server-assigned subscription id.
    pub id: String,
    /// Whether the subscription delivers field-level patches.
    pub diff: bool,
    /// Millis since Unix epoch when the entry was registered.
    pub created_at_ms: u64,
    /// Millis since Unix epoch of the last routed push, if any.
    pub last_event_time_ms: Option<u64>,
    /// Number of push frames routed to this subscription.
    pub frames_routed: u64,
}
