//! Listener abstraction shared by callback- and stream-style subscriptions.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::{fmt, sync::Arc};
use tokio::sync::mpsc;

use crate::models::ChangeNotification;

/// Destination for normalized notifications of one subscription.
///
/// Called from the receive task, one notification at a time, in the order
/// the push frames arrived.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    /// Deliver one notification. Returns `false` once the listener is gone,
    /// which lets the table drop the entry.
    async fn deliver(&self, notification: ChangeNotification<JsonValue>) -> bool;
}

/// Callback invoked for each raw notification.
pub type RawNotificationCallback = Arc<dyn Fn(ChangeNotification<JsonValue>) + Send + Sync>;

/// Calls a function for every notification.
pub struct CallbackSink {
    callback: RawNotificationCallback,
}

impl CallbackSink {
    pub fn new(callback: impl Fn(ChangeNotification<JsonValue>) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl fmt::Debug for CallbackSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackSink")
    }
}

#[async_trait]
impl NotificationSink for CallbackSink {
    async fn deliver(&self, notification: ChangeNotification<JsonValue>) -> bool {
        (self.callback)(notification);
        true
    }
}

/// Pushes every notification into a bounded channel.
///
/// A full channel suspends the receive task until the consumer catches up.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<ChangeNotification<JsonValue>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<ChangeNotification<JsonValue>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn deliver(&self, notification: ChangeNotification<JsonValue>) -> bool {
        self.tx.send(notification).await.is_ok()
    }
}
