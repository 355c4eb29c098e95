use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use super::live_action::LiveAction;
use super::patch_operation::PatchOp;

/// Normalized kind of a live-query change.
///
/// Full-value subscriptions produce `Create`, `Update`, or `Remove`;
/// diff-mode subscriptions produce `Add`, `Replace`, or `Remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Add,
    Replace,
    Remove,
}

impl From<LiveAction> for ChangeKind {
    fn from(action: LiveAction) -> Self {
        match action {
            LiveAction::Create => ChangeKind::Create,
            LiveAction::Update => ChangeKind::Update,
            LiveAction::Delete => ChangeKind::Remove,
        }
    }
}

impl From<PatchOp> for ChangeKind {
    fn from(op: PatchOp) -> Self {
        match op {
            PatchOp::Add => ChangeKind::Add,
            PatchOp::Replace => ChangeKind::Replace,
            PatchOp::Remove => ChangeKind::Remove,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Add => "add",
            ChangeKind::Replace => "replace",
            ChangeKind::Remove => "remove",
        };
        f.write_str(s)
    }
}

/// One change delivered to a live-query listener.
///
/// `path` is `None` for full-value notifications and carries the patch
/// path in diff mode (empty for the terminal delete notification).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification<T = JsonValue> {
    pub kind: ChangeKind,
    pub path: Option<String>,
    pub value: Option<T>,
}

impl<T> ChangeNotification<T> {
    pub fn new(kind: ChangeKind, path: Option<String>, value: Option<T>) -> Self {
        Self { kind, path, value }
    }

    /// Whether this notification signals removal of the record or field.
    pub fn is_remove(&self) -> bool {
        self.kind == ChangeKind::Remove
    }
}
