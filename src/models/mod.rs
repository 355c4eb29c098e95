//! Data models for strata-link.
//!
//! Wire envelopes, decoded inbound frames, live-query notification shapes,
//! and connection configuration.

pub mod backpressure_policy;
pub mod change_notification;
pub mod connection_options;
pub mod connection_state;
pub mod inbound_frame;
pub mod live_action;
pub mod live_update;
pub mod patch_operation;
pub mod rpc_error_detail;
pub mod rpc_request;
pub mod subscription_info;


pub use backpressure_policy::BackpressurePolicy;
pub use change_notification::{ChangeKind, ChangeNotification};
pub use connection_options::ConnectionOptions;
pub use connection_state::ConnectionState;
pub use inbound_frame::InboundFrame;
pub use live_action::LiveAction;
pub use live_update::LiveUpdate;
pub use patch_operation::{PatchOp, PatchOperation};
pub use rpc_error_detail::RpcErrorDetail;
pub use rpc_request::RpcRequest;
pub use subscription_info::SubscriptionInfo;
