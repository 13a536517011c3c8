//! services/api/src/adapters/local_relay.rs
//!
//! Implements the `RelayTransport` port in-process, without an HTTP hop to
//! the relay endpoint.

use crate::web::relay::Relay;
use async_trait::async_trait;
use reading_list_core::ports::{PortResult, RelayTransport};
use reading_list_core::relay::{RelayEnvelope, RelayFailure, RelayRequest};

#[derive(Clone, Debug, Default)]
pub struct LocalRelay {
    relay: Relay,
}

impl LocalRelay {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl RelayTransport for LocalRelay {
    async fn relay(&self, request: RelayRequest) -> PortResult<RelayEnvelope> {
        Ok(match self.relay.forward(request).await {
            Ok(reply) => RelayEnvelope::Reply(reply),
            Err(e) => RelayEnvelope::Failure(RelayFailure {
                error: e.to_string(),
            }),
        })
    }
}
