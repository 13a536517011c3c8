//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::web::relay::Relay;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }
}
