//! Low-level WebSocket helpers: endpoint resolution and keepalive jitter.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

use crate::error::{Result, StrataLinkError};

pub(crate) type WebSocketStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<TcpStream>>;

/// Map a base address onto the RPC WebSocket endpoint.
///
/// `http(s)://host` becomes `ws(s)://host<rpc_path>`. A `ws(s)://` address
/// that already carries a path is used as-is.
pub(crate) fn resolve_ws_url(address: &str, rpc_path: &str) -> Result<String> {
    let base = Url::parse(address.trim()).map_err(|e| {
        StrataLinkError::Configuration(format!("Invalid address '{}': {}", address, e))
    })?;

    if base.host_str().is_none() {
        return Err(StrataLinkError::Configuration(format!(
            "Address '{}' must include a host",
            address
        )));
    }
    if !base.username().is_empty() || base.password().is_some() {
        return Err(StrataLinkError::Configuration(
            "Address must not include username/password credentials".to_string(),
        ));
    }
    if base.query().is_some() || base.fragment().is_some() {
        return Err(StrataLinkError::Configuration(
            "Address must not include query parameters or fragments".to_string(),
        ));
    }

    let (ws_scheme, keep_path) = match base.scheme() {
        "http" => ("ws", false),
        "https" => ("wss", false),
        "ws" => ("ws", base.path() != "/"),
        "wss" => ("wss", base.path() != "/"),
        other => {
            return Err(StrataLinkError::Configuration(format!(
                "Unsupported address scheme '{}'; expected http(s) or ws(s)",
                other
            )));
        },
    };

    let mut ws_url = base.clone();
    ws_url.set_scheme(ws_scheme).map_err(|_| {
        StrataLinkError::Configuration("Failed to set WebSocket URL scheme".to_string())
    })?;
    if !keep_path {
        let path = if rpc_path.starts_with('/') {
            rpc_path.to_string()
        } else {
            format!("/{}", rpc_path)
        };
        ws_url.set_path(&path);
    }

    Ok(ws_url.to_string())
}

/// Spread keepalive pings across connections to avoid synchronized bursts.
///
/// Jitter is derived deterministically from `key` within +/-20% of `base`.
pub(crate) fn jitter_keepalive_interval(base: Duration, key: &str) -> Duration {
    let base_ms = base.as_millis() as u64;
    if base_ms <= 1 {
        return base;
    }

    let jitter_span = (base_ms / 5).max(1);
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hashed = hasher.finish();

    let offset = (hashed % (2 * jitter_span + 1)) as i64 - jitter_span as i64;
    let jittered_ms = if offset >= 0 {
        base_ms.saturating_add(offset as u64)
    } else {
        base_ms.saturating_sub((-offset) as u64).max(1)
    };

    Duration::from_millis(jittered_ms)
}
