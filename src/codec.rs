//! Wire codec for the RPC WebSocket protocol.
//!
//! Outbound calls are `{"id", "method", "params"}` envelopes. Inbound text
//! frames are either correlated responses (`{"id", "result" | "error"}`) or
//! push notifications (`{"result": {"id": <subscription>, "result": <payload>}}`).
//! A frame with a non-null top-level `id` is always a response.

use serde_json::{Map, Value as JsonValue};

use crate::{
    error::{Result, StrataLinkError},
    models::{InboundFrame, LiveAction, LiveUpdate, RpcErrorDetail, RpcRequest},
};

/// Serialize a call envelope to its JSON text form.
pub fn encode_request(request: &RpcRequest) -> Result<String> {
    serde_json::to_string(request)
        .map_err(|e| StrataLinkError::Decode(format!("Failed to serialize request: {}", e)))
}

/// Parse a call envelope. Used by fake servers and diagnostics.
pub fn decode_request(text: &str) -> Result<RpcRequest> {
    serde_json::from_str(text)
        .map_err(|e| StrataLinkError::Decode(format!("Invalid request envelope: {}", e)))
}

/// Decode one inbound text frame.
pub fn decode_frame(text: &str) -> Result<InboundFrame> {
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|e| StrataLinkError::Decode(format!("Frame is not valid JSON: {}", e)))?;
    let obj = value
        .as_object()
        .ok_or_else(|| StrataLinkError::Decode("Frame is not a JSON object".to_string()))?;

    match obj.get("id") {
        Some(id) if !id.is_null() => decode_response(parse_request_id(id)?, obj),
        _ => decode_notification(obj),
    }
}

fn decode_response(id: u64, obj: &Map<String, JsonValue>) -> Result<InboundFrame> {
    let outcome = match obj.get("error") {
        Some(err) if !err.is_null() => Err(rpc_error_from_value(err)),
        _ => Ok(obj.get("result").cloned().unwrap_or(JsonValue::Null)),
    };
    Ok(InboundFrame::Response { id, outcome })
}

fn decode_notification(obj: &Map<String, JsonValue>) -> Result<InboundFrame> {
    let inner = obj
        .get("result")
        .and_then(JsonValue::as_object)
        .ok_or_else(|| {
            StrataLinkError::Decode(
                "Frame has neither a request id nor a notification body".to_string(),
            )
        })?;

    let subscription_id = match inner.get("id") {
        Some(JsonValue::String(s)) => s.clone(),
        _ => {
            return Err(StrataLinkError::Decode(
                "Notification is missing a string subscription id".to_string(),
            ))
        },
    };

    let action = inner
        .get("action")
        .and_then(JsonValue::as_str)
        .and_then(LiveAction::parse);

    Ok(InboundFrame::Notification(LiveUpdate {
        subscription_id,
        action,
        payload: inner.get("result").cloned().unwrap_or(JsonValue::Null),
    }))
}

/// Request ids go out as integers; servers that echo them back as numeric
/// strings are accepted too.
fn parse_request_id(id: &JsonValue) -> Result<u64> {
    match id {
        JsonValue::Number(n) => n
            .as_u64()
            .ok_or_else(|| StrataLinkError::Decode(format!("Request id {} is not a u64", n))),
        JsonValue::String(s) => s
            .parse::<u64>()
            .map_err(|_| StrataLinkError::Decode(format!("Request id '{}' is not numeric", s))),
        other => Err(StrataLinkError::Decode(format!("Unsupported request id: {}", other))),
    }
}

fn rpc_error_from_value(err: &JsonValue) -> StrataLinkError {
    match err {
        JsonValue::String(message) => StrataLinkError::Rpc {
            code: None,
            message: message.clone(),
        },
        other => match serde_json::from_value::<RpcErrorDetail>(other.clone()) {
            Ok(detail) => detail.into(),
            Err(_) => StrataLinkError::Rpc {
                code: None,
                message: other.to_string(),
            },
        },
    }
}
