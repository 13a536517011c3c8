//! crates/reading_list_core/src/relay.rs
//!
//! Wire types for the same-origin relay endpoint. A `RelayRequest` describes
//! one HTTP call the relay performs on the caller's behalf; a `RelayEnvelope`
//! is what comes back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Logical description of an HTTP request to forward.
///
/// Every field is optional on the wire so that a missing `url` can be
/// reported as a client error instead of a decoding failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RelayRequest {
    /// Starts a request description for `method url`.
    pub fn new(method: &str, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            method: Some(method.to_string()),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.into());
        self
    }

    /// Attaches a JSON payload, serialized by the relay.
    pub fn json(self, data: Value) -> Self {
        let mut req = self.header("Content-Type", "application/json");
        req.data = Some(data);
        req
    }

    /// Attaches a pre-encoded `application/x-www-form-urlencoded` body.
    pub fn form(self, body: impl Into<String>) -> Self {
        let mut req = self.header("Content-Type", "application/x-www-form-urlencoded");
        req.body = Some(body.into());
        req
    }

    pub fn method_or_default(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }
}

/// A completed upstream exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayReply {
    pub status: u16,
    #[serde(rename = "statusText", default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// The upstream body parsed as JSON, or the raw text when it is not JSON.
    #[serde(default)]
    pub data: Value,
}

impl RelayReply {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// The relay could not perform the exchange at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayFailure {
    pub error: String,
}

/// Everything the relay can answer with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayEnvelope {
    Reply(RelayReply),
    Failure(RelayFailure),
}
