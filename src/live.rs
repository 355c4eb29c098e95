//! Live-query adapter.
//!
//! Turns raw push payloads into [`ChangeNotification`]s. Two payload shapes
//! exist:
//!
//! - **Full-value** (`diff = false`): the payload is the complete record, or
//!   `null` when it was deleted. The kind comes from the server's action tag.
//! - **Diff** (`diff = true`): the payload is an array of `{op, path, value}`
//!   patches, each emitted as its own notification in array order. A payload
//!   that is not an array is the terminal delete notification.
//!
//! Malformed patch entries and values that fail to decode are logged and
//! skipped individually so siblings in the same frame are still delivered.

use serde_json::{Map, Value as JsonValue};

use crate::{
    error::Result,
    models::{ChangeKind, ChangeNotification, LiveUpdate, PatchOperation},
    value_codec::ValueDecoder,
};

/// Normalize one push frame into zero or more raw notifications.
pub fn normalize(update: &LiveUpdate, diff: bool) -> Vec<ChangeNotification<JsonValue>> {
    if diff {
        normalize_patches(update)
    } else {
        vec![normalize_full_value(update)]
    }
}

fn normalize_full_value(update: &LiveUpdate) -> ChangeNotification<JsonValue> {
    if update.payload.is_null() {
        return ChangeNotification::new(ChangeKind::Remove, None, None);
    }

    let kind = match update.action {
        Some(action) => ChangeKind::from(action),
        None => {
            log::debug!(
                "[strata-link] Notification for {} has no action tag; treating as update",
                update.subscription_id
            );
            ChangeKind::Update
        },
    };
    ChangeNotification::new(kind, None, Some(update.payload.clone()))
}

fn normalize_patches(update: &LiveUpdate) -> Vec<ChangeNotification<JsonValue>> {
    let entries = match &update.payload {
        JsonValue::Array(entries) => entries,
        _ => {
            return vec![ChangeNotification::new(ChangeKind::Remove, Some(String::new()), None)];
        },
    };

    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<PatchOperation>(entry.clone()) {
            Ok(patch) => {
                out.push(ChangeNotification::new(patch.op.into(), Some(patch.path), patch.value))
            },
            Err(e) => log::warn!(
                "[strata-link] Skipping malformed patch #{} for {}: {}",
                index,
                update.subscription_id,
                e
            ),
        }
    }
    out
}

/// Decode a raw notification's value through `codec`.
///
/// Diff-mode fragments that are bare scalars are wrapped as
/// `{<last path segment>: value}` before decoding, so a codec for the record
/// type can decode a single replaced field. This only matches flat paths; a
/// nested path like `/address/city` yields `{"city": ..}`, not a record.
pub fn decode_notification<T>(
    notification: ChangeNotification<JsonValue>,
    codec: &dyn ValueDecoder<T>,
) -> Result<ChangeNotification<T>> {
    let ChangeNotification { kind, path, value } = notification;
    let value = match value {
        None => None,
        Some(raw) => {
            let raw = match path.as_deref() {
                Some(p) if !p.is_empty() && is_scalar(&raw) => wrap_in_last_segment(p, raw),
                _ => raw,
            };
            Some(codec.decode(raw)?)
        },
    };
    Ok(ChangeNotification { kind, path, value })
}

/// Normalize and decode, dropping (and logging) anything that fails to decode.
pub fn adapt<T>(
    update: &LiveUpdate,
    diff: bool,
    codec: &dyn ValueDecoder<T>,
) -> Vec<ChangeNotification<T>> {
    normalize(update, diff)
        .into_iter()
        .filter_map(|raw| match decode_notification(raw, codec) {
            Ok(n) => Some(n),
            Err(e) => {
                log::warn!(
                    "[strata-link] Dropping undecodable notification for {}: {}",
                    update.subscription_id,
                    e
                );
                None
            },
        })
        .collect()
}

fn is_scalar(value: &JsonValue) -> bool {
    !matches!(value, JsonValue::Object(_) | JsonValue::Array(_))
}

fn wrap_in_last_segment(path: &str, value: JsonValue) -> JsonValue {
    let segment = path.rsplit('/').next().unwrap_or(path);
    // JSON Pointer escapes (RFC 6901)
    let key = segment.replace("~1", "/").replace("~0", "~");
    let mut map = Map::with_capacity(1);
    map.insert(key, value);
    JsonValue::Object(map)
}
