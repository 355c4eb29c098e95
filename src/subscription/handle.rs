//! `LiveHandle` – ownership token for a callback-style live query.

use serde_json::Value as JsonValue;
use std::{
    fmt,
    sync::{Arc, Weak},
};

use super::sink::CallbackSink;
use crate::{
    connection::SharedState,
    error::Result,
    live,
    models::ChangeNotification,
    value_codec::ValueDecoder,
};

/// Keeps a callback subscription alive. Dropping it kills the query.
pub struct LiveHandle {
    subscription_id: String,
    connection: Option<Weak<SharedState>>,
}

impl LiveHandle {
    pub(crate) fn new(subscription_id: String, connection: Weak<SharedState>) -> Self {
        Self {
            subscription_id,
            connection: Some(connection),
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Remove the callback, then kill the query on the server.
    pub async fn close(&mut self) -> Result<()> {
        match self.connection.take().and_then(|weak| weak.upgrade()) {
            Some(shared) => shared.kill_subscription(&self.subscription_id).await,
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.connection.is_none()
    }
}

impl fmt::Debug for LiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveHandle")
            .field("subscription_id", &self.subscription_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Drop for LiveHandle {
    fn drop(&mut self) {
        if let Some(shared) = self.connection.take().and_then(|weak| weak.upgrade()) {
            shared.release_subscription(&self.subscription_id);
        }
    }
}

/// Wrap a typed callback into a raw sink that decodes through `codec`.
pub(crate) fn typed_callback_sink<T, F>(
    codec: Arc<dyn ValueDecoder<T>>,
    callback: F,
) -> CallbackSink
where
    T: 'static,
    F: Fn(ChangeNotification<T>) + Send + Sync + 'static,
{
    CallbackSink::new(move |raw: ChangeNotification<JsonValue>| {
        match live::decode_notification(raw, codec.as_ref()) {
            Ok(notification) => callback(notification),
            Err(e) => log::warn!("[strata-link] Skipping undecodable notification: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeKind;
    use crate::subscription::NotificationSink;
    use crate::value_codec::JsonCodec;
    use serde_json::json;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_typed_callback_wraps_scalar_patch_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sink = typed_callback_sink(
            Arc::new(JsonCodec::<JsonValue>::new()),
            move |n: ChangeNotification<JsonValue>| seen_clone.lock().unwrap().push(n.value),
        );

        sink.deliver(ChangeNotification::new(
            ChangeKind::Replace,
            Some("/name".to_string()),
            Some(json!("grace")),
        ))
        .await;
        assert_eq!(*seen.lock().unwrap(), vec![Some(json!({ "name": "grace" }))]);
    }

    #[tokio::test]
    async fn test_close_detached_handle() {
        let mut handle = LiveHandle::new("sub-9".to_string(), Weak::new());
        assert!(!handle.is_closed());
        handle.close().await.unwrap();
        assert!(handle.is_closed());
    }
}
