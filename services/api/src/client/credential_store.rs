//! services/api/src/client/credential_store.rs
//!
//! Persists the OAuth2 token and connection settings.
//!
//! Two stores are kept: the durable store (token, credentials, base URL) and
//! the session markers (setup flag, base URL), mirroring browser storage and
//! cookies. Writes go to every store that holds a key; reads take the first
//! populated one, in the order credentials, durable, markers. Storage
//! failures are logged and read as "nothing stored".

use reading_list_core::domain::{Credentials, TokenData, DEFAULT_TOKEN_LIFETIME_SECS};
use reading_list_core::ports::{Clock, KeyValueStore};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub const TOKEN_KEY: &str = "wallabag_token";
pub const CREDENTIALS_KEY: &str = "wallabag_credentials";
pub const BASE_URL_KEY: &str = "wallabag_url";
pub const SETUP_COMPLETE_KEY: &str = "wallabag_setup_complete";

/// Strips a single trailing slash.
pub fn normalize_base_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

pub struct CredentialStore {
    durable: Arc<dyn KeyValueStore>,
    markers: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl CredentialStore {
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        markers: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            durable,
            markers,
            clock,
        }
    }

    //-------------------------------------------------------------------------------------
    // Token
    //-------------------------------------------------------------------------------------

    /// Stores `token` with an absolute expiry. A token without an access token
    /// is refused and the stored state is left as it was.
    pub fn save_token(&self, token: &TokenData) {
        if token.access_token.is_empty() {
            error!("Cannot save token: access_token is missing");
            return;
        }

        let lifetime = token
            .expires_in
            .filter(|secs| *secs != 0)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        let record = TokenData {
            expires_at: Some(
                self.clock
                    .now_millis()
                    .saturating_add(lifetime.saturating_mul(1000)),
            ),
            ..token.clone()
        };

        write_json(self.durable.as_ref(), TOKEN_KEY, &record);
    }

    /// The stored token while it is still valid.
    ///
    /// An expired record is deleted before `None` is returned.
    pub fn get_token(&self) -> Option<TokenData> {
        let token: TokenData = read_json(self.durable.as_ref(), TOKEN_KEY)?;

        if let Some(expires_at) = token.expires_at {
            if self.clock.now_millis() >= expires_at {
                debug!(expires_at, "Stored token expired, purging it");
                remove(self.durable.as_ref(), TOKEN_KEY);
                return None;
            }
        }
        Some(token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }

    pub fn clear_token(&self) {
        remove(self.durable.as_ref(), TOKEN_KEY);
    }

    //-------------------------------------------------------------------------------------
    // Credentials
    //-------------------------------------------------------------------------------------

    pub fn save_credentials(&self, credentials: &Credentials) {
        let record = Credentials {
            api_url: normalize_base_url(&credentials.api_url),
            ..credentials.clone()
        };
        write_json(self.durable.as_ref(), CREDENTIALS_KEY, &record);
    }

    /// The stored credentials, or an all-empty record.
    pub fn get_credentials(&self) -> Credentials {
        read_json(self.durable.as_ref(), CREDENTIALS_KEY).unwrap_or_default()
    }

    pub fn clear_credentials(&self) {
        remove(self.durable.as_ref(), CREDENTIALS_KEY);
    }

    //-------------------------------------------------------------------------------------
    // Base URL and setup markers
    //-------------------------------------------------------------------------------------

    /// Resolves the remote service address, without a trailing slash.
    pub fn base_url(&self) -> Option<String> {
        let credentials = self.get_credentials();
        if !credentials.api_url.is_empty() {
            return Some(normalize_base_url(&credentials.api_url));
        }

        [self.durable.as_ref(), self.markers.as_ref()]
            .into_iter()
            .find_map(|store| read(store, BASE_URL_KEY).filter(|url| !url.is_empty()))
            .map(|url| normalize_base_url(&url))
    }

    /// Records that setup succeeded against `api_url`.
    pub fn mark_setup_complete(&self, api_url: &str) {
        let api_url = normalize_base_url(api_url);
        write(self.durable.as_ref(), BASE_URL_KEY, &api_url);
        write(self.markers.as_ref(), BASE_URL_KEY, &api_url);
        write(self.markers.as_ref(), SETUP_COMPLETE_KEY, "true");
    }

    pub fn is_configured(&self) -> bool {
        [self.markers.as_ref(), self.durable.as_ref()]
            .into_iter()
            .any(|store| read(store, SETUP_COMPLETE_KEY).is_some())
    }

    /// Forgets everything: token, credentials and markers in both stores.
    /// Both stores hold only this client's keys, so each is cleared whole.
    pub fn logout(&self) {
        for store in [self.durable.as_ref(), self.markers.as_ref()] {
            if let Err(e) = store.clear() {
                error!("Error clearing storage: {}", e);
            }
        }
    }
}

//=========================================================================================
// Storage helpers (log, never propagate)
//=========================================================================================

fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, "Error reading storage: {}", e);
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            error!(key, "Failed to parse stored record: {}", e);
            None
        }
    }
}

fn write(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        error!(key, "Error saving to storage: {}", e);
    }
}

fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => write(store, key, &json),
        Err(e) => error!(key, "Failed to serialize record: {}", e),
    }
}

fn remove(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        error!(key, "Error clearing storage: {}", e);
    }
}
