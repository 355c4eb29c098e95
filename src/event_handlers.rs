//! Connection lifecycle hooks.
//!
//! All hooks are optional and run on the connection's own tasks, so they
//! must return quickly:
//!
//! - [`on_connect`](EventHandlers::on_connect): handshake completed
//! - [`on_disconnect`](EventHandlers::on_disconnect): teardown finished
//! - [`on_error`](EventHandlers::on_error): handshake or transport failure
//! - [`on_state_change`](EventHandlers::on_state_change): every lifecycle transition
//! - [`on_receive`](EventHandlers::on_receive) / [`on_send`](EventHandlers::on_send):
//!   raw frame tracing
//!
//! ```rust
//! use strata_link::EventHandlers;
//!
//! let handlers = EventHandlers::new()
//!     .on_connect(|| println!("connected"))
//!     .on_disconnect(|reason| println!("disconnected: {}", reason))
//!     .on_state_change(|state| println!("state: {}", state));
//! assert!(handlers.has_any());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::models::ConnectionState;

/// Why a connection was torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectReason {
    pub message: String,
    /// WebSocket close code when the server sent one.
    pub code: Option<u16>,
}

impl DisconnectReason {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code: Some(code),
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code: {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Error information passed to the `on_error` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionError {
    pub message: String,
    /// `true` when the failure happened after the handshake.
    pub after_handshake: bool,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>, after_handshake: bool) -> Self {
        Self {
            message: message.into(),
            after_handshake,
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub type OnConnectCallback = Arc<dyn Fn() + Send + Sync>;
pub type OnDisconnectCallback = Arc<dyn Fn(DisconnectReason) + Send + Sync>;
pub type OnErrorCallback = Arc<dyn Fn(ConnectionError) + Send + Sync>;
pub type OnStateChangeCallback = Arc<dyn Fn(ConnectionState) + Send + Sync>;
/// Raw frame hook, used for both directions.
pub type OnFrameCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Connection lifecycle hooks.
#[derive(Clone, Default)]
pub struct EventHandlers {
    pub(crate) on_connect: Option<OnConnectCallback>,
    pub(crate) on_disconnect: Option<OnDisconnectCallback>,
    pub(crate) on_error: Option<OnErrorCallback>,
    pub(crate) on_state_change: Option<OnStateChangeCallback>,
    pub(crate) on_receive: Option<OnFrameCallback>,
    pub(crate) on_send: Option<OnFrameCallback>,
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_connect", &self.on_connect.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_state_change", &self.on_state_change.is_some())
            .field("on_receive", &self.on_receive.is_some())
            .field("on_send", &self.on_send.is_some())
            .finish()
    }
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the WebSocket handshake completes.
    pub fn on_connect(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_connect = Some(Arc::new(f));
        self
    }

    /// Called once per connection after teardown has drained pending calls.
    pub fn on_disconnect(mut self, f: impl Fn(DisconnectReason) + Send + Sync + 'static) -> Self {
        self.on_disconnect = Some(Arc::new(f));
        self
    }

    /// Called when the handshake fails or the transport breaks.
    pub fn on_error(mut self, f: impl Fn(ConnectionError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Called after every lifecycle transition with the new state.
    pub fn on_state_change(mut self, f: impl Fn(ConnectionState) + Send + Sync + 'static) -> Self {
        self.on_state_change = Some(Arc::new(f));
        self
    }

    /// Debug hook receiving every inbound text payload before decoding.
    pub fn on_receive(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_receive = Some(Arc::new(f));
        self
    }

    /// Debug hook receiving every outbound payload as it is written.
    pub fn on_send(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_send = Some(Arc::new(f));
        self
    }

    pub fn has_any(&self) -> bool {
        self.on_connect.is_some()
            || self.on_disconnect.is_some()
            || self.on_error.is_some()
            || self.on_state_change.is_some()
            || self.on_receive.is_some()
            || self.on_send.is_some()
    }

    pub(crate) fn emit_connect(&self) {
        if let Some(cb) = &self.on_connect {
            cb();
        }
    }

    pub(crate) fn emit_disconnect(&self, reason: DisconnectReason) {
        if let Some(cb) = &self.on_disconnect {
            cb(reason);
        }
    }

    pub(crate) fn emit_error(&self, error: ConnectionError) {
        if let Some(cb) = &self.on_error {
            cb(error);
        }
    }

    pub(crate) fn emit_state_change(&self, state: ConnectionState) {
        if let Some(cb) = &self.on_state_change {
            cb(state);
        }
    }

    pub(crate) fn emit_receive(&self, raw: &str) {
        if let Some(cb) = &self.on_receive {
            cb(raw);
        }
    }

    pub(crate) fn emit_send(&self, raw: &str) {
        if let Some(cb) = &self.on_send {
            cb(raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_empty_handlers() {
        let handlers = EventHandlers::new();
        assert!(!handlers.has_any());
        handlers.emit_connect();
        handlers.emit_disconnect(DisconnectReason::new("noop"));
    }

    #[test]
    fn test_state_change_hook_receives_states_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let handlers =
            EventHandlers::new().on_state_change(move |s| seen_clone.lock().unwrap().push(s));

        handlers.emit_state_change(ConnectionState::Connecting);
        handlers.emit_state_change(ConnectionState::Open);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionState::Connecting, ConnectionState::Open]
        );
    }

    #[test]
    fn test_disconnect_reason_display() {
        assert_eq!(DisconnectReason::new("bye").to_string(), "bye");
        assert_eq!(DisconnectReason::with_code("bye", 1000).to_string(), "bye (code: 1000)");
    }
}
