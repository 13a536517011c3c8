//! services/api/src/adapters/http_relay.rs
//!
//! Implements the `RelayTransport` port by POSTing request descriptions to a
//! running relay endpoint over HTTP.

use async_trait::async_trait;
use reading_list_core::ports::{PortError, PortResult, RelayTransport};
use reading_list_core::relay::{RelayEnvelope, RelayRequest};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRelayClient {
    /// `endpoint` is the full relay URL, e.g. `http://127.0.0.1:3000/api/proxy`.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelayClient {
    async fn relay(&self, request: RelayRequest) -> PortResult<RelayEnvelope> {
        debug!(endpoint = %self.endpoint, target = ?request.url, "Sending request to relay");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "Proxy returned {}: {}",
                status.as_u16(),
                text
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| PortError::Transport(format!("Invalid relay response: {}", e)))
    }
}
