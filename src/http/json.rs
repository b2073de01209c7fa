//! Pluggable JSON provider.
//!
//! The context talks to JSON through [`JsonProvider`] so applications can
//! swap the encoder (pretty output, stricter decoding, ...). The trait works
//! on [`serde_json::Value`] to stay object safe; typed conversion happens in
//! the context.

use serde_json::Value;
use thiserror::Error;

use crate::BoxError;

/// Errors raised at the JSON boundary. Propagated to the caller unchanged.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("failed to encode JSON: {0}")]
    Encode(#[source] BoxError),

    #[error("failed to decode JSON: {0}")]
    Decode(#[source] BoxError),
}

impl JsonError {
    pub fn encode(source: impl Into<BoxError>) -> Self {
        Self::Encode(source.into())
    }

    pub fn decode(source: impl Into<BoxError>) -> Self {
        Self::Decode(source.into())
    }
}

pub trait JsonProvider: Send + Sync + 'static {
    fn encode(&self, value: &Value) -> Result<String, JsonError>;

    fn decode(&self, text: &str) -> Result<Value, JsonError>;
}

/// `serde_json`-backed provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonProvider {
    pretty: bool,
}

impl SerdeJsonProvider {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl JsonProvider for SerdeJsonProvider {
    fn encode(&self, value: &Value) -> Result<String, JsonError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        encoded.map_err(JsonError::encode)
    }

    fn decode(&self, text: &str) -> Result<Value, JsonError> {
        serde_json::from_str(text).map_err(JsonError::decode)
    }
}
