//! # strata-link
//!
//! Client driver for a database that speaks JSON RPC over a single
//! WebSocket. One connection carries any number of concurrent calls,
//! correlated by request id, plus asynchronous live-query pushes routed by
//! subscription id.
//!
//! ```rust,no_run
//! use serde::Deserialize;
//! use strata_link::{StrataLinkClient, StrataLinkTimeouts};
//!
//! #[derive(Debug, Deserialize)]
//! struct Person {
//!     name: String,
//! }
//!
//! # async fn example() -> strata_link::Result<()> {
//! let client = StrataLinkClient::builder()
//!     .base_url("http://localhost:8000")
//!     .timeouts(StrataLinkTimeouts::default())
//!     .build()?;
//! client.connect().await?;
//! client.use_ns_db("test", "test").await?;
//!
//! let people: Vec<Person> = client.select("person").await?;
//! println!("{:?}", people);
//!
//! let mut changes = client.live_stream::<Person>("person", false).await?;
//! while let Some(change) = changes.next().await {
//!     println!("{} {:?}", change.kind, change.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! When the connection is torn down, every in-flight call fails with the
//! teardown error and every live query simply stops delivering. No error is
//! pushed into subscription sinks.

pub mod client;
pub mod codec;
pub mod connection;
pub mod error;
pub mod event_handlers;
pub mod live;
pub mod models;
pub mod subscription;
pub mod timeouts;
pub mod value_codec;

pub use client::{StrataLinkClient, StrataLinkClientBuilder};
pub use connection::{ConnectionManager, ResponseHandle};
pub use error::{Result, StrataLinkError};
pub use event_handlers::{ConnectionError, DisconnectReason, EventHandlers};
pub use models::{
    BackpressurePolicy, ChangeKind, ChangeNotification, ConnectionOptions, ConnectionState,
    SubscriptionInfo,
};
pub use subscription::{CallbackSink, ChannelSink, LiveHandle, LiveStream, NotificationSink};
pub use timeouts::{StrataLinkTimeouts, StrataLinkTimeoutsBuilder};
pub use value_codec::{JsonCodec, ValueDecoder, ValueEncoder};
