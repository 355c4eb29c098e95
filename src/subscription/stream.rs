//! `LiveStream` – pull-style consumer for one live query.

use serde_json::Value as JsonValue;
use std::{
    fmt,
    sync::{Arc, Weak},
};
use tokio::sync::mpsc;

use crate::{
    connection::SharedState,
    error::Result,
    live,
    models::ChangeNotification,
    value_codec::ValueDecoder,
};

/// Typed notifications of one live query, in arrival order.
///
/// The stream ends once the subscription is closed or the connection goes
/// away. Notifications whose value the codec cannot decode are skipped with
/// a warning.
///
/// # Examples
///
/// ```rust,no_run
/// use strata_link::StrataLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StrataLinkClient::builder()
///     .base_url("ws://localhost:8000")
///     .build()?;
/// client.connect().await?;
///
/// let mut people = client.live_stream::<serde_json::Value>("person", false).await?;
/// while let Some(change) = people.next().await {
///     println!("{} {:?}", change.kind, change.value);
/// }
/// # Ok(())
/// # }
/// ```
pub struct LiveStream<T> {
    subscription_id: String,
    event_rx: mpsc::Receiver<ChangeNotification<JsonValue>>,
    codec: Arc<dyn ValueDecoder<T>>,
    /// `None` once closed, so `Drop` does not kill twice.
    connection: Option<Weak<SharedState>>,
    closed: bool,
}

impl<T> LiveStream<T> {
    pub(crate) fn new(
        subscription_id: String,
        event_rx: mpsc::Receiver<ChangeNotification<JsonValue>>,
        codec: Arc<dyn ValueDecoder<T>>,
        connection: Weak<SharedState>,
    ) -> Self {
        Self {
            subscription_id,
            event_rx,
            codec,
            connection: Some(connection),
            closed: false,
        }
    }

    /// Next decoded notification, or `None` once the subscription is over.
    pub async fn next(&mut self) -> Option<ChangeNotification<T>> {
        loop {
            if self.closed {
                return None;
            }
            match self.event_rx.recv().await {
                Some(raw) => match live::decode_notification(raw, self.codec.as_ref()) {
                    Ok(notification) => return Some(notification),
                    Err(e) => log::warn!(
                        "[strata-link] Skipping undecodable notification on {}: {}",
                        self.subscription_id,
                        e
                    ),
                },
                None => {
                    self.closed = true;
                    return None;
                },
            }
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Stop routing and kill the query on the server.
    ///
    /// The local entry is removed before the `kill` request is sent, so no
    /// notification is delivered after this is called.
    pub async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.event_rx.close();
        match self.connection.take().and_then(|weak| weak.upgrade()) {
            Some(shared) => shared.kill_subscription(&self.subscription_id).await,
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T> fmt::Debug for LiveStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveStream")
            .field("subscription_id", &self.subscription_id)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<T> Drop for LiveStream<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.connection.take().and_then(|weak| weak.upgrade()) {
            shared.release_subscription(&self.subscription_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeKind;
    use crate::value_codec::JsonCodec;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
    }

    fn detached_stream<T: serde::de::DeserializeOwned + 'static>(
    ) -> (mpsc::Sender<ChangeNotification<JsonValue>>, LiveStream<T>) {
        let (tx, rx) = mpsc::channel(8);
        let stream = LiveStream::new(
            "sub-test".to_string(),
            rx,
            Arc::new(JsonCodec::<T>::new()),
            Weak::new(),
        );
        (tx, stream)
    }

    #[tokio::test]
    async fn test_next_decodes_and_skips_bad_values() {
        let (tx, mut stream) = detached_stream::<Person>();
        tx.send(ChangeNotification::new(ChangeKind::Create, None, Some(json!(42))))
            .await
            .unwrap();
        tx.send(ChangeNotification::new(
            ChangeKind::Create,
            None,
            Some(json!({ "name": "ada" })),
        ))
        .await
        .unwrap();
        drop(tx);

        let first = stream.next().await.unwrap();
        assert_eq!(first.value, Some(Person { name: "ada".into() }));
        assert!(stream.next().await.is_none());
        assert!(stream.is_closed());
    }

    #[tokio::test]
    async fn test_close_without_connection_is_ok() {
        let (_tx, mut stream) = detached_stream::<JsonValue>();
        assert!(!stream.is_closed());
        stream.close().await.unwrap();
        assert!(stream.is_closed());
        assert!(stream.next().await.is_none());
        assert_eq!(stream.subscription_id(), "sub-test");
    }
}
