use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Outbound call envelope: `{"id": 1, "method": "...", "params": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Request id, unique for the lifetime of one connection
    pub id: u64,
    /// RPC method name
    pub method: String,
    /// Positional parameters
    #[serde(default)]
    pub params: Vec<JsonValue>,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<JsonValue>) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }
}
