use serde::{Deserialize, Serialize};

use crate::error::StrataLinkError;

/// `error` object carried by a failed correlated response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorDetail {
    /// Optional numeric error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Human-readable error message
    pub message: String,
}

impl From<RpcErrorDetail> for StrataLinkError {
    fn from(detail: RpcErrorDetail) -> Self {
        StrataLinkError::Rpc {
            code: detail.code,
            message: detail.message,
        }
    }
}
