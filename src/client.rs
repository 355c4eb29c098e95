//! Main strata-link client with builder pattern.
//!
//! Wraps one [`ConnectionManager`] and exposes the RPC verbs and live-query
//! helpers on top of it.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{
    connection::{websocket::resolve_ws_url, ConnectionManager, ResponseHandle},
    error::{Result, StrataLinkError},
    event_handlers::EventHandlers,
    models::{ChangeNotification, ConnectionOptions, ConnectionState, SubscriptionInfo},
    subscription::{typed_callback_sink, ChannelSink, LiveHandle, LiveStream, NotificationSink},
    timeouts::StrataLinkTimeouts,
    value_codec::{JsonCodec, ValueDecoder, ValueEncoder},
};

/// Main strata-link client.
///
/// Use [`StrataLinkClientBuilder`] to construct instances. Clones share the
/// same connection; it is closed when the last clone is dropped or
/// [`disconnect`](Self::disconnect) is called.
///
/// # Examples
///
/// ```rust,no_run
/// use strata_link::StrataLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StrataLinkClient::builder()
///     .base_url("http://localhost:8000")
///     .build()?;
/// client.connect().await?;
///
/// client.use_ns_db("test", "test").await?;
/// let version = client.version().await?;
/// println!("server {}", version);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StrataLinkClient {
    base_url: String,
    connection: Arc<ConnectionManager>,
    timeouts: StrataLinkTimeouts,
    options: ConnectionOptions,
}

impl StrataLinkClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> StrataLinkClientBuilder {
        StrataLinkClientBuilder::new()
    }

    /// Open the WebSocket, bounded by `connection_timeout`.
    pub async fn connect(&self) -> Result<()> {
        self.connection
            .connect(&self.base_url, self.timeouts.connection_timeout)
            .await
    }

    /// Close the connection. Pending calls fail with `ConnectionClosed`.
    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.connection.subscriptions()
    }

    pub fn timeouts(&self) -> &StrataLinkTimeouts {
        &self.timeouts
    }

    /// Send one request and wait for its raw result.
    ///
    /// Applies `request_timeout`. On timeout the pending entry is dropped
    /// and a late response is ignored.
    pub async fn call_raw(&self, method: &str, params: Vec<JsonValue>) -> Result<JsonValue> {
        let handle = self.connection.send(method, params).await?;
        self.await_response(method, handle).await
    }

    /// Send one request and decode the result through `decoder`.
    pub async fn call_with<T>(
        &self,
        method: &str,
        params: Vec<JsonValue>,
        decoder: &dyn ValueDecoder<T>,
    ) -> Result<T> {
        let raw = self.call_raw(method, params).await?;
        decoder.decode(raw)
    }

    /// Send `params` followed by `data` encoded through `encoder`, and
    /// decode the result through `decoder`.
    pub async fn call_with_data<D, T>(
        &self,
        method: &str,
        mut params: Vec<JsonValue>,
        data: &D,
        encoder: &dyn ValueEncoder<D>,
        decoder: &dyn ValueDecoder<T>,
    ) -> Result<T> {
        params.push(encoder.encode(data)?);
        self.call_with(method, params, decoder).await
    }

    /// Send one request and deserialize the result with serde.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<JsonValue>,
    ) -> Result<T> {
        self.call_with(method, params, &JsonCodec::<T>::new()).await
    }

    async fn await_response(&self, method: &str, mut handle: ResponseHandle) -> Result<JsonValue> {
        let timeout = self.timeouts.request_timeout;
        if StrataLinkTimeouts::is_no_timeout(timeout) {
            return handle.await;
        }
        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(outcome) => outcome,
            Err(_) => {
                if !self.connection.cancel(handle.id()) {
                    // Taken by the receive task after the deadline. It
                    // completes the handle without yielding.
                    return handle.await;
                }
                log::warn!(
                    "[strata-link] Request {} ({}) timed out after {:?}",
                    handle.id(),
                    method,
                    timeout
                );
                Err(StrataLinkError::Timeout(format!(
                    "{} request timed out after {:?}",
                    method, timeout
                )))
            },
        }
    }

    // ---- RPC verbs ----

    pub async fn version(&self) -> Result<String> {
        self.call("version", vec![]).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.call_raw("ping", vec![]).await.map(|_| ())
    }

    /// Switch namespace and database for subsequent calls.
    pub async fn use_ns_db(&self, namespace: &str, database: &str) -> Result<()> {
        self.call_raw("use", vec![json!(namespace), json!(database)])
            .await
            .map(|_| ())
    }

    /// Run a query with bound variables. Returns the raw per-statement results.
    pub async fn query<V: Serialize>(&self, sql: &str, vars: V) -> Result<JsonValue> {
        self.call_with_data(
            "query",
            vec![json!(sql)],
            &vars,
            &JsonCodec::<V>::new(),
            &JsonCodec::<JsonValue>::new(),
        )
        .await
    }

    pub async fn select<T: DeserializeOwned>(&self, thing: &str) -> Result<T> {
        self.call("select", vec![json!(thing)]).await
    }

    pub async fn create<D, T>(&self, thing: &str, data: D) -> Result<T>
    where
        D: Serialize,
        T: DeserializeOwned,
    {
        self.record_call("create", thing, &data).await
    }

    pub async fn update<D, T>(&self, thing: &str, data: D) -> Result<T>
    where
        D: Serialize,
        T: DeserializeOwned,
    {
        self.record_call("update", thing, &data).await
    }

    pub async fn merge<D, T>(&self, thing: &str, data: D) -> Result<T>
    where
        D: Serialize,
        T: DeserializeOwned,
    {
        self.record_call("merge", thing, &data).await
    }

    async fn record_call<D, T>(&self, method: &str, thing: &str, data: &D) -> Result<T>
    where
        D: Serialize,
        T: DeserializeOwned,
    {
        self.call_with_data(
            method,
            vec![json!(thing)],
            data,
            &JsonCodec::<D>::new(),
            &JsonCodec::<T>::new(),
        )
        .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, thing: &str) -> Result<T> {
        self.call("delete", vec![json!(thing)]).await
    }

    /// Start a live query and return its id without attaching a listener.
    ///
    /// Pushes that arrive before a listener is registered through
    /// [`ConnectionManager::subscribe`] are dropped. Prefer
    /// [`live_stream`](Self::live_stream) or [`live_callback`](Self::live_callback).
    pub async fn live(&self, table: &str, diff: bool) -> Result<String> {
        self.call("live", vec![json!(table), json!(diff)]).await
    }

    /// Stop a live query and drop its local listener.
    pub async fn kill(&self, subscription_id: &str) -> Result<()> {
        self.connection.unsubscribe(subscription_id);
        self.call_raw("kill", vec![json!(subscription_id)])
            .await
            .map(|_| ())
    }

    // ---- live queries ----

    /// Start a live query on `table` and consume it as a stream.
    pub async fn live_stream<T>(&self, table: &str, diff: bool) -> Result<LiveStream<T>>
    where
        T: DeserializeOwned + 'static,
    {
        self.live_stream_with(table, diff, Arc::new(JsonCodec::<T>::new()))
            .await
    }

    /// Like [`live_stream`](Self::live_stream) with an explicit value decoder.
    pub async fn live_stream_with<T: 'static>(
        &self,
        table: &str,
        diff: bool,
        decoder: Arc<dyn ValueDecoder<T>>,
    ) -> Result<LiveStream<T>> {
        let capacity = self.options.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel(capacity);
        let sink = Arc::new(ChannelSink::new(event_tx));
        let subscription_id = self.start_live(table, diff, sink).await?;
        Ok(LiveStream::new(
            subscription_id,
            event_rx,
            decoder,
            Arc::downgrade(&self.connection.shared()),
        ))
    }

    /// Start a live query on `table` and invoke `callback` for every change.
    ///
    /// The callback runs on the receive task and must not block.
    pub async fn live_callback<T, F>(
        &self,
        table: &str,
        diff: bool,
        callback: F,
    ) -> Result<LiveHandle>
    where
        T: DeserializeOwned + 'static,
        F: Fn(ChangeNotification<T>) + Send + Sync + 'static,
    {
        self.live_callback_with(table, diff, Arc::new(JsonCodec::<T>::new()), callback)
            .await
    }

    /// Like [`live_callback`](Self::live_callback) with an explicit value decoder.
    pub async fn live_callback_with<T, F>(
        &self,
        table: &str,
        diff: bool,
        decoder: Arc<dyn ValueDecoder<T>>,
        callback: F,
    ) -> Result<LiveHandle>
    where
        T: 'static,
        F: Fn(ChangeNotification<T>) + Send + Sync + 'static,
    {
        let sink = Arc::new(typed_callback_sink(decoder, callback));
        let subscription_id = self.start_live(table, diff, sink).await?;
        Ok(LiveHandle::new(
            subscription_id,
            Arc::downgrade(&self.connection.shared()),
        ))
    }

    async fn start_live(
        &self,
        table: &str,
        diff: bool,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<String> {
        let handle = self
            .connection
            .send_live("live", vec![json!(table), json!(diff)], sink, diff)
            .await?;
        let raw = self.await_response("live", handle).await?;
        let subscription_id = JsonCodec::<String>::new().decode(raw)?;
        log::info!(
            "[strata-link] Live query on '{}' started as {} (diff={})",
            table,
            subscription_id,
            diff
        );
        Ok(subscription_id)
    }
}

/// Builder for configuring [`StrataLinkClient`] instances.
#[derive(Debug, Default)]
pub struct StrataLinkClientBuilder {
    base_url: Option<String>,
    timeouts: StrataLinkTimeouts,
    connection_options: ConnectionOptions,
    event_handlers: EventHandlers,
}

impl StrataLinkClientBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Server address: `http(s)://host[:port]` or a full `ws(s)://` URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set every timeout at once.
    ///
    /// # Example
    ///
    /// ```rust
    /// use strata_link::{StrataLinkClient, StrataLinkTimeouts};
    ///
    /// let client = StrataLinkClient::builder()
    ///     .base_url("http://localhost:8000")
    ///     .timeouts(StrataLinkTimeouts::fast())
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(client.timeouts().request_timeout, StrataLinkTimeouts::fast().request_timeout);
    /// ```
    pub fn timeouts(mut self, timeouts: StrataLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set queue sizes, back-pressure policy and RPC path.
    pub fn connection_options(mut self, options: ConnectionOptions) -> Self {
        self.connection_options = options;
        self
    }

    /// Install connection lifecycle hooks.
    pub fn event_handlers(mut self, handlers: EventHandlers) -> Self {
        self.event_handlers = handlers;
        self
    }

    /// Validate the configuration and build an unconnected client.
    pub fn build(self) -> Result<StrataLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| StrataLinkError::Configuration("base_url is required".into()))?;
        // Fail early on addresses connect() could never use.
        resolve_ws_url(&base_url, &self.connection_options.rpc_path)?;
        if self.connection_options.outbound_queue_capacity == 0 {
            return Err(StrataLinkError::Configuration(
                "outbound_queue_capacity must be at least 1".into(),
            ));
        }
        if self.connection_options.event_channel_capacity == 0 {
            return Err(StrataLinkError::Configuration(
                "event_channel_capacity must be at least 1".into(),
            ));
        }

        let connection = ConnectionManager::new(
            self.connection_options.clone(),
            self.timeouts.clone(),
            self.event_handlers,
        );

        Ok(StrataLinkClient {
            base_url,
            connection: Arc::new(connection),
            timeouts: self.timeouts,
            options: self.connection_options,
        })
    }
}
