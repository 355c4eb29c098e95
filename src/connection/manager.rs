//! Request/response multiplexer over a single WebSocket.
//!
//! One [`ConnectionManager`] owns one socket and two background tasks:
//!
//! - the **send task** drains a bounded outbound queue into the socket and
//!   drives keepalive pings,
//! - the **receive task** decodes inbound frames and routes responses to the
//!   pending-call table and pushes to the subscription table.
//!
//! Callers never touch the socket. [`ConnectionManager::send`] assigns a
//! fresh id, records a pending entry, enqueues the encoded request and
//! returns a [`ResponseHandle`] that resolves when the matching response
//! arrives or the connection goes away.

use bytes::Bytes;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde_json::Value as JsonValue;
use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    task::{Context, Poll},
    time::Duration,
};
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    task::JoinHandle,
    time::Instant as TokioInstant,
};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{
    pending::{LiveRegistration, PendingCalls, ResponseReceiver},
    websocket::{jitter_keepalive_interval, resolve_ws_url, WebSocketStream},
};
use crate::{
    codec,
    error::{Result, StrataLinkError},
    event_handlers::{ConnectionError, DisconnectReason, EventHandlers},
    models::{
        BackpressurePolicy, ConnectionOptions, ConnectionState, InboundFrame, RpcRequest,
        SubscriptionInfo,
    },
    subscription::{NotificationSink, SubscriptionTable},
    timeouts::StrataLinkTimeouts,
};

/// Deadline used when a timer is disabled.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365);

/// Work item for the send task.
enum Outbound {
    Text(String),
    Pong(Bytes),
}

/// Resolves to the outcome of one request.
///
/// Dropping the handle does not remove the pending entry; the response is
/// discarded when it arrives. Use [`ConnectionManager::cancel`] to forget
/// the entry immediately.
#[derive(Debug)]
pub struct ResponseHandle {
    id: u64,
    rx: ResponseReceiver,
}

impl ResponseHandle {
    /// Request id assigned by the manager.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Future for ResponseHandle {
    type Output = Result<JsonValue>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            // Sender dropped without completing: the table went away.
            Poll::Ready(Err(_)) => Poll::Ready(Err(StrataLinkError::ConnectionClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

struct ConnectionTasks {
    send_task: JoinHandle<()>,
    recv_task: JoinHandle<()>,
}

/// State shared between the public handle and the background tasks.
pub(crate) struct Inner {
    state: Mutex<ConnectionState>,
    address: Mutex<Option<String>>,
    next_id: AtomicU64,
    pending: PendingCalls,
    subscriptions: SubscriptionTable,
    outbound: Mutex<Option<mpsc::Sender<Outbound>>>,
    shutdown: watch::Sender<bool>,
    inbound_frames: AtomicU64,
    options: ConnectionOptions,
    timeouts: StrataLinkTimeouts,
    handlers: EventHandlers,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Inner {
    fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    /// Move to `next`, or report the state that made it illegal.
    fn transition(&self, next: ConnectionState) -> Result<()> {
        {
            let mut state = lock(&self.state);
            if !state.can_transition_to(next) {
                return Err(StrataLinkError::InvalidState {
                    expected: format!("a state that can move to {}", next),
                    actual: state.to_string(),
                });
            }
            *state = next;
        }
        log::debug!("[strata-link] Connection state -> {}", next);
        self.handlers.emit_state_change(next);
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state() {
            ConnectionState::Open => Ok(()),
            state if state.is_terminating() => Err(StrataLinkError::ConnectionClosed),
            state => Err(StrataLinkError::InvalidState {
                expected: ConnectionState::Open.to_string(),
                actual: state.to_string(),
            }),
        }
    }

    fn outbound_sender(&self) -> Option<mpsc::Sender<Outbound>> {
        lock(&self.outbound).clone()
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn note_inbound(&self) -> u64 {
        self.inbound_frames.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn inbound_count(&self) -> u64 {
        self.inbound_frames.load(Ordering::SeqCst)
    }

    /// Register, encode and enqueue one request.
    async fn send_call(
        &self,
        method: &str,
        params: Vec<JsonValue>,
        live: Option<LiveRegistration>,
    ) -> Result<ResponseHandle> {
        self.ensure_open()?;
        let tx = self.outbound_sender().ok_or(StrataLinkError::ConnectionClosed)?;

        let id = self.next_request_id();
        let text = codec::encode_request(&RpcRequest::new(id, method, params))?;
        let rx = self.pending.register_with(id, method, live)?;

        // Teardown sets the state before draining, so an entry registered
        // after the drain is caught here.
        if self.state() != ConnectionState::Open {
            self.pending.cancel(id);
            return Err(StrataLinkError::ConnectionClosed);
        }

        let capacity = self.options.outbound_queue_capacity;
        let enqueued = match self.options.backpressure {
            BackpressurePolicy::FailFast => {
                tx.try_send(Outbound::Text(text)).map_err(|e| match e {
                    TrySendError::Full(_) => StrataLinkError::Backpressure { capacity },
                    TrySendError::Closed(_) => StrataLinkError::ConnectionClosed,
                })
            },
            BackpressurePolicy::Block => tx
                .send(Outbound::Text(text))
                .await
                .map_err(|_| StrataLinkError::ConnectionClosed),
        };

        if let Err(e) = enqueued {
            self.pending.cancel(id);
            log::debug!("[strata-link] Request {} ({}) not enqueued: {}", id, method, e);
            return Err(e);
        }

        log::trace!("[strata-link] Enqueued request {} ({})", id, method);
        Ok(ResponseHandle { id, rx })
    }

    /// Enqueue a request whose response is discarded. Never waits.
    fn send_detached(&self, method: &str, params: Vec<JsonValue>) -> bool {
        if self.state() != ConnectionState::Open {
            return false;
        }
        let Some(tx) = self.outbound_sender() else {
            return false;
        };

        let id = self.next_request_id();
        let text = match codec::encode_request(&RpcRequest::new(id, method, params)) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("[strata-link] Failed to encode {} request: {}", method, e);
                return false;
            },
        };
        // The receiver is dropped right away; the entry is removed when the
        // response arrives or on teardown.
        if self.pending.register(id, method).is_err() {
            return false;
        }
        if tx.try_send(Outbound::Text(text)).is_err() {
            self.pending.cancel(id);
            log::debug!("[strata-link] Dropped detached {} request {}", method, id);
            return false;
        }
        true
    }

    /// Route one decoded text payload.
    async fn dispatch(&self, text: &str) {
        match codec::decode_frame(text) {
            Ok(InboundFrame::Response { id, outcome }) => self.resolve_response(id, outcome),
            Ok(InboundFrame::Notification(update)) => {
                self.subscriptions.invoke(update).await;
            },
            Err(e) => log::warn!("[strata-link] Dropping unrecognized frame: {}", e),
        }
    }

    fn resolve_response(&self, id: u64, outcome: Result<JsonValue>) {
        let Some(mut call) = self.pending.take(id) else {
            log::debug!("[strata-link] No pending call for response id {}", id);
            return;
        };

        // Live calls install their listener before the caller is woken so
        // that pushes following the response are routed.
        let mut registered = None;
        if let (Ok(value), Some(live)) = (&outcome, call.take_live()) {
            match value.as_str() {
                Some(sub_id) => {
                    self.subscriptions.register(sub_id, live.sink, live.diff);
                    registered = Some(sub_id.to_string());
                },
                None => log::warn!(
                    "[strata-link] Live request {} returned a non-string id: {}",
                    id,
                    value
                ),
            }
        }

        let method = call.method().to_string();
        if !call.complete(outcome) {
            log::debug!("[strata-link] Caller for request {} ({}) stopped waiting", id, method);
            if let Some(sub_id) = registered {
                self.subscriptions.remove(&sub_id);
                self.send_detached("kill", vec![JsonValue::String(sub_id)]);
            }
        }
    }

    /// Drop the listener for `id` and tell the server, without waiting.
    pub(crate) fn release_subscription(&self, id: &str) {
        if self.subscriptions.remove(id) {
            self.send_detached("kill", vec![JsonValue::String(id.to_string())]);
        }
    }

    /// Drop the listener for `id` and wait for the server to acknowledge
    /// the kill, bounded by the request timeout.
    pub(crate) async fn kill_subscription(&self, id: &str) -> Result<()> {
        self.subscriptions.remove(id);
        if self.state() != ConnectionState::Open {
            return Ok(());
        }
        let handle = self
            .send_call("kill", vec![JsonValue::String(id.to_string())], None)
            .await?;
        let request_id = handle.id();
        let timeout = self.timeouts.request_timeout;
        if StrataLinkTimeouts::is_no_timeout(timeout) {
            return handle.await.map(|_| ());
        }
        match tokio::time::timeout(timeout, handle).await {
            Ok(outcome) => outcome.map(|_| ()),
            Err(_) => {
                self.pending.cancel(request_id);
                Err(StrataLinkError::Timeout(format!("kill {} after {:?}", id, timeout)))
            },
        }
    }

    fn enqueue_pong(&self, payload: Bytes) {
        if let Some(tx) = self.outbound_sender() {
            if tx.try_send(Outbound::Pong(payload)).is_err() {
                log::debug!("[strata-link] Outbound queue full, skipping pong");
            }
        }
    }

    /// Fail everything in flight and close. Only the first caller does work.
    fn teardown(&self, error: StrataLinkError, reason: DisconnectReason) -> bool {
        let previous = {
            let mut state = lock(&self.state);
            let previous = *state;
            match previous {
                ConnectionState::Open => *state = ConnectionState::Closing,
                ConnectionState::Unconnected | ConnectionState::Connecting => {
                    *state = ConnectionState::Closed
                },
                ConnectionState::Closing | ConnectionState::Closed => return false,
            }
            previous
        };

        if previous == ConnectionState::Open {
            self.handlers.emit_state_change(ConnectionState::Closing);
            self.shutdown.send_replace(true);
            lock(&self.outbound).take();

            let failed = self.pending.drain(&error);
            let cleared = self.subscriptions.clear();
            log::info!(
                "[strata-link] Connection closing ({}): failed {} pending call(s), \
                 dropped {} subscription(s)",
                reason,
                failed,
                cleared
            );

            *lock(&self.state) = ConnectionState::Closed;
            self.handlers.emit_state_change(ConnectionState::Closed);
            self.handlers.emit_disconnect(reason);
        } else {
            self.handlers.emit_state_change(ConnectionState::Closed);
        }
        true
    }
}

/// Owns one WebSocket connection and multiplexes requests over it.
pub struct ConnectionManager {
    inner: Arc<Inner>,
    tasks: Mutex<Option<ConnectionTasks>>,
}

impl ConnectionManager {
    pub fn new(
        options: ConnectionOptions,
        timeouts: StrataLinkTimeouts,
        handlers: EventHandlers,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ConnectionState::Unconnected),
                address: Mutex::new(None),
                next_id: AtomicU64::new(1),
                pending: PendingCalls::new(),
                subscriptions: SubscriptionTable::new(),
                outbound: Mutex::new(None),
                shutdown,
                inbound_frames: AtomicU64::new(0),
                options,
                timeouts,
                handlers,
            }),
            tasks: Mutex::new(None),
        }
    }

    /// Open the socket and start the background tasks.
    ///
    /// Only legal from `Unconnected`. On failure or timeout the manager ends
    /// in `Closed` and the attempt is dropped. A zero `timeout` waits
    /// indefinitely.
    pub async fn connect(&self, address: &str, timeout: Duration) -> Result<()> {
        self.inner.transition(ConnectionState::Connecting)?;

        let url = match resolve_ws_url(address, &self.inner.options.rpc_path) {
            Ok(url) => url,
            Err(e) => {
                self.inner.teardown(e.clone(), DisconnectReason::new("Invalid address"));
                return Err(e);
            },
        };

        log::info!("[strata-link] Connecting to {}", url);
        let attempt = connect_async(url.as_str());
        let outcome = if StrataLinkTimeouts::is_no_timeout(timeout) {
            Ok(attempt.await)
        } else {
            tokio::time::timeout(timeout, attempt).await
        };

        let ws = match outcome {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => return Err(self.fail_connect(&url, e.to_string())),
            Err(_) => {
                return Err(self.fail_connect(&url, format!("timed out after {:?}", timeout)))
            },
        };

        let capacity = self.inner.options.outbound_queue_capacity.max(1);
        let (out_tx, out_rx) = mpsc::channel(capacity);
        *lock(&self.inner.outbound) = Some(out_tx);
        *lock(&self.inner.address) = Some(url.clone());

        if let Err(e) = self.inner.transition(ConnectionState::Open) {
            // disconnect() won the race while the handshake was in flight.
            lock(&self.inner.outbound).take();
            let mut ws = ws;
            let _ = ws.close(None).await;
            log::debug!("[strata-link] Connect aborted: {}", e);
            return Err(StrataLinkError::ConnectionClosed);
        }

        let (sink, stream) = ws.split();
        let shutdown_rx = self.inner.shutdown.subscribe();
        let keepalive = jitter_keepalive_interval(self.inner.timeouts.keepalive_interval, &url);
        let send_task = tokio::spawn(send_loop(
            self.inner.clone(),
            sink,
            out_rx,
            shutdown_rx,
            keepalive,
        ));
        let recv_task = tokio::spawn(receive_loop(self.inner.clone(), stream));
        *lock(&self.tasks) = Some(ConnectionTasks {
            send_task,
            recv_task,
        });

        log::info!("[strata-link] Connected to {}", url);
        self.inner.handlers.emit_connect();
        Ok(())
    }

    fn fail_connect(&self, url: &str, cause: String) -> StrataLinkError {
        log::warn!("[strata-link] Connection to {} failed: {}", url, cause);
        self.inner.handlers.emit_error(ConnectionError::new(cause.clone(), false));
        let error = StrataLinkError::Connection {
            address: url.to_string(),
            cause,
        };
        self.inner.teardown(error.clone(), DisconnectReason::new("Connection failed"));
        error
    }

    /// Send a request and get a handle to its response.
    ///
    /// Fails with `Backpressure` when the outbound queue is full under
    /// [`BackpressurePolicy::FailFast`]; under `Block` it waits for room.
    pub async fn send(&self, method: &str, params: Vec<JsonValue>) -> Result<ResponseHandle> {
        self.inner.send_call(method, params, None).await
    }

    /// Like [`send`](Self::send), but when the call succeeds with a string
    /// result the sink is registered under that id before the caller wakes.
    pub async fn send_live(
        &self,
        method: &str,
        params: Vec<JsonValue>,
        sink: Arc<dyn NotificationSink>,
        diff: bool,
    ) -> Result<ResponseHandle> {
        self.inner
            .send_call(method, params, Some(LiveRegistration { sink, diff }))
            .await
    }

    /// Enqueue a request and ignore its response. Returns `false` when the
    /// request could not be queued.
    pub fn send_detached(&self, method: &str, params: Vec<JsonValue>) -> bool {
        self.inner.send_detached(method, params)
    }

    /// Forget a pending request. Its response, if any, is discarded.
    ///
    /// Returns `false` when the entry is already gone. The receive task (or
    /// teardown) then completes the handle without yielding, so awaiting it
    /// returns promptly with the delivered outcome.
    pub fn cancel(&self, id: u64) -> bool {
        self.inner.pending.cancel(id)
    }

    /// Register a listener for push frames carrying `id`.
    pub fn subscribe(&self, id: impl Into<String>, sink: Arc<dyn NotificationSink>, diff: bool) {
        self.inner.subscriptions.register(id, sink, diff);
    }

    /// Remove a listener locally. Does not notify the server.
    pub fn unsubscribe(&self, id: &str) -> bool {
        self.inner.subscriptions.remove(id)
    }

    /// Snapshot of the active subscriptions.
    pub fn subscriptions(&self) -> Vec<SubscriptionInfo> {
        self.inner.subscriptions.snapshot()
    }

    pub fn has_subscription(&self, id: &str) -> bool {
        self.inner.subscriptions.contains(id)
    }

    /// Number of requests awaiting a response.
    pub fn pending_calls(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Resolved WebSocket URL, once `connect` got that far.
    pub fn address(&self) -> Option<String> {
        lock(&self.inner.address).clone()
    }

    pub(crate) fn shared(&self) -> Arc<Inner> {
        self.inner.clone()
    }

    /// Close the connection. Idempotent and never fails.
    ///
    /// Every pending call completes with `ConnectionClosed` and every
    /// subscription is dropped.
    pub async fn disconnect(&self) {
        self.inner.teardown(
            StrataLinkError::ConnectionClosed,
            DisconnectReason::new("Client disconnected"),
        );

        let tasks = lock(&self.tasks).take();
        if let Some(ConnectionTasks {
            mut send_task,
            recv_task,
        }) = tasks
        {
            recv_task.abort();
            // Give the send task a chance to write the close frame.
            let grace = self.inner.timeouts.close_timeout + Duration::from_millis(100);
            if tokio::time::timeout(grace, &mut send_task).await.is_err() {
                send_task.abort();
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.inner.teardown(
            StrataLinkError::ConnectionClosed,
            DisconnectReason::new("Connection dropped"),
        );
        if let Some(tasks) = lock(&self.tasks).take() {
            // The send task sees the shutdown signal and closes the socket.
            tasks.recv_task.abort();
        }
    }
}

/// Read frames until the socket fails or closes, then tear down.
async fn receive_loop(inner: Arc<Inner>, mut stream: SplitStream<WebSocketStream>) {
    let max_bytes = inner.options.max_message_bytes;

    let (error, reason) = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                inner.note_inbound();
                if text.len() > max_bytes {
                    log::warn!(
                        "[strata-link] Text frame too large ({} bytes), dropped",
                        text.len()
                    );
                    continue;
                }
                inner.handlers.emit_receive(text.as_str());
                inner.dispatch(text.as_str()).await;
            },
            Some(Ok(Message::Binary(data))) => {
                inner.note_inbound();
                if data.len() > max_bytes {
                    log::warn!(
                        "[strata-link] Binary frame too large ({} bytes), dropped",
                        data.len()
                    );
                    continue;
                }
                match std::str::from_utf8(&data) {
                    Ok(text) => {
                        inner.handlers.emit_receive(text);
                        inner.dispatch(text).await;
                    },
                    Err(e) => log::warn!("[strata-link] Binary frame is not UTF-8: {}", e),
                }
            },
            Some(Ok(Message::Ping(payload))) => {
                inner.note_inbound();
                inner.enqueue_pong(payload);
            },
            Some(Ok(Message::Pong(_))) => {
                inner.note_inbound();
                log::debug!("[strata-link] Keepalive: received Pong");
            },
            Some(Ok(Message::Close(frame))) => {
                let reason = match frame {
                    Some(f) => DisconnectReason::with_code(f.reason.to_string(), f.code.into()),
                    None => DisconnectReason::new("Server closed connection"),
                };
                break (
                    StrataLinkError::Transport(format!("connection closed by server: {}", reason)),
                    reason,
                );
            },
            Some(Ok(Message::Frame(_))) => {},
            Some(Err(e)) => {
                let msg = e.to_string();
                inner.handlers.emit_error(ConnectionError::new(msg.clone(), true));
                break (
                    StrataLinkError::Transport(msg.clone()),
                    DisconnectReason::new(format!("WebSocket error: {}", msg)),
                );
            },
            None => {
                break (
                    StrataLinkError::Transport("WebSocket stream ended".to_string()),
                    DisconnectReason::new("WebSocket stream ended"),
                );
            },
        }
    };

    if inner.teardown(error, reason) {
        log::warn!("[strata-link] Receive loop ended, connection torn down");
    }
}

/// Write queued frames and keep the connection alive until shutdown.
async fn send_loop(
    inner: Arc<Inner>,
    mut sink: SplitSink<WebSocketStream, Message>,
    mut out_rx: mpsc::Receiver<Outbound>,
    mut shutdown_rx: watch::Receiver<bool>,
    keepalive: Duration,
) {
    let has_keepalive = !inner.timeouts.keepalive_interval.is_zero();
    let keepalive = if has_keepalive { keepalive } else { FAR_FUTURE };
    let pong_timeout = inner.timeouts.pong_timeout;
    let has_pong_timeout = has_keepalive && !pong_timeout.is_zero();

    let mut idle_deadline = TokioInstant::now() + keepalive;
    let mut pong_deadline = TokioInstant::now() + FAR_FUTURE;
    let mut awaiting_pong = false;
    let mut frames_at_ping = 0u64;

    loop {
        let idle_sleep = tokio::time::sleep_until(idle_deadline);
        tokio::pin!(idle_sleep);
        let pong_sleep = tokio::time::sleep_until(pong_deadline);
        tokio::pin!(pong_sleep);

        let write = tokio::select! {
            biased;

            _ = shutdown_rx.changed() => break,

            _ = &mut pong_sleep, if has_pong_timeout && awaiting_pong => {
                awaiting_pong = false;
                pong_deadline = TokioInstant::now() + FAR_FUTURE;
                if inner.inbound_count() == frames_at_ping {
                    log::warn!(
                        "[strata-link] Pong timeout ({:?}), server unresponsive",
                        pong_timeout
                    );
                    inner.handlers.emit_error(ConnectionError::new("pong timeout", true));
                    inner.teardown(
                        StrataLinkError::Transport("pong timeout".to_string()),
                        DisconnectReason::new(format!("Pong timeout ({:?})", pong_timeout)),
                    );
                    break;
                }
                continue;
            }

            item = out_rx.recv() => match item {
                Some(Outbound::Text(text)) => {
                    inner.handlers.emit_send(&text);
                    sink.send(Message::Text(text.into())).await
                },
                Some(Outbound::Pong(payload)) => sink.send(Message::Pong(payload)).await,
                None => break,
            },

            _ = &mut idle_sleep, if has_keepalive && !awaiting_pong => {
                let sent = sink.send(Message::Ping(Bytes::new())).await;
                if sent.is_ok() {
                    inner.handlers.emit_send("[ping]");
                    if has_pong_timeout {
                        awaiting_pong = true;
                        frames_at_ping = inner.inbound_count();
                        pong_deadline = TokioInstant::now() + pong_timeout;
                    }
                }
                sent
            }
        };

        if let Err(e) = write {
            let msg = e.to_string();
            log::warn!("[strata-link] WebSocket write failed: {}", msg);
            inner.handlers.emit_error(ConnectionError::new(msg.clone(), true));
            inner.teardown(
                StrataLinkError::Transport(msg.clone()),
                DisconnectReason::new(format!("Write failed: {}", msg)),
            );
            return;
        }
        idle_deadline = TokioInstant::now() + keepalive;
    }

    let close_timeout = inner.timeouts.close_timeout;
    match tokio::time::timeout(close_timeout, sink.close()).await {
        Ok(Ok(())) => log::debug!("[strata-link] Close frame sent"),
        Ok(Err(e)) => log::debug!("[strata-link] Close failed: {}", e),
        Err(_) => log::debug!("[strata-link] Close timed out after {:?}", close_timeout),
    }
}
