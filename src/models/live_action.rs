use serde::{Deserialize, Serialize};

/// Action tag the server attaches to full-value live notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiveAction {
    Create,
    Update,
    Delete,
}

impl LiveAction {
    /// Parse an action tag case-insensitively. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "create" => Some(LiveAction::Create),
            "update" => Some(LiveAction::Update),
            "delete" => Some(LiveAction::Delete),
            _ => None,
        }
    }
}
