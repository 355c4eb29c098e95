use serde_json::Value as JsonValue;

use super::live_action::LiveAction;

/// A raw push notification, routed by subscription id before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveUpdate {
    /// Server-assigned subscription id
    pub subscription_id: String,
    /// Action tag, when the server supplied a recognizable one
    pub action: Option<LiveAction>,
    /// Full record value, `null`, or an array of patch operations
    pub payload: JsonValue,
}
