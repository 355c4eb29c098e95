//! Live-query subscriptions.
//!
//! Push frames are routed by subscription id through the
//! [`SubscriptionTable`] to a [`NotificationSink`]. Two consumer surfaces
//! sit on top: [`LiveStream`] for pull-style iteration and [`LiveHandle`]
//! for callback registration.

mod handle;
mod sink;
mod stream;
mod table;

pub use handle::LiveHandle;
pub(crate) use handle::typed_callback_sink;
pub use sink::{CallbackSink, ChannelSink, NotificationSink, RawNotificationCallback};
pub use stream::LiveStream;
pub(crate) use table::SubscriptionTable;
