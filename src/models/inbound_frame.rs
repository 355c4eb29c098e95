use serde_json::Value as JsonValue;

use super::live_update::LiveUpdate;
use crate::error::Result;

/// One decoded inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Reply correlated to a previous call by `id`.
    Response {
        id: u64,
        outcome: Result<JsonValue>,
    },
    /// Push notification for a live subscription.
    Notification(LiveUpdate),
}
