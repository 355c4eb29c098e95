//! Conversion between domain values and the generic JSON carried on the wire.
//!
//! The connection core only moves [`serde_json::Value`]. Callers that want
//! typed values pass a [`ValueDecoder`] for results and a [`ValueEncoder`]
//! for params explicitly; [`JsonCodec`] implements each for every type that
//! implements the matching serde trait.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, StrataLinkError};

/// Decodes JSON results and notification values into `T`.
pub trait ValueDecoder<T>: Send + Sync {
    fn decode(&self, value: JsonValue) -> Result<T>;
}

/// Encodes `T` into a JSON request param.
pub trait ValueEncoder<T>: Send + Sync {
    fn encode(&self, value: &T) -> Result<JsonValue>;
}

/// serde-backed codec: decodes any `DeserializeOwned` type and encodes any
/// `Serialize` type.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<T: Serialize> ValueEncoder<T> for JsonCodec<T> {
    fn encode(&self, value: &T) -> Result<JsonValue> {
        serde_json::to_value(value)
            .map_err(|e| StrataLinkError::Decode(format!("Failed to encode value: {}", e)))
    }
}

impl<T: DeserializeOwned> ValueDecoder<T> for JsonCodec<T> {
    fn decode(&self, value: JsonValue) -> Result<T> {
        serde_json::from_value(value)
            .map_err(|e| StrataLinkError::Decode(format!("Failed to decode value: {}", e)))
    }
}
