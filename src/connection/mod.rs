//! WebSocket connection management.
//!
//! - [`websocket`]: endpoint resolution and keepalive jitter
//! - [`pending`]: the pending-call table correlating responses to requests
//! - [`manager`]: the multiplexer owning the socket and its tasks

pub mod manager;
pub(crate) mod pending;
pub(crate) mod websocket;

pub use manager::{ConnectionManager, ResponseHandle};
pub(crate) use manager::Inner as SharedState;
