//! services/api/src/config.rs
//!
//! Defines the application's configuration structures and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for the HTTP server (relay, access gate and pages).
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
}

/// Settings for the command-line client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub relay_url: String,
    pub state_dir: PathBuf,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        Ok(Self {
            bind_address,
            log_level: log_level_from_env()?,
        })
    }
}

impl ClientConfig {
    /// Loads the client configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let relay_url = std::env::var("RELAY_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000/api/proxy".to_string());
        url::Url::parse(&relay_url)
            .map_err(|e| ConfigError::InvalidValue("RELAY_URL".to_string(), e.to_string()))?;

        let state_dir = std::env::var("READER_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir());

        Ok(Self {
            relay_url,
            state_dir,
            log_level: log_level_from_env()?,
        })
    }

    /// File backing the durable store (token, credentials, base URL).
    pub fn durable_path(&self) -> PathBuf {
        self.state_dir.join("storage.json")
    }

    /// File backing the session markers (setup flag, base URL).
    pub fn markers_path(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }
}

/// `<data dir>/reading-list`, or the working directory when there is none.
pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("reading-list"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn load_dotenv() {
    // Only load from .env in non-test mode to avoid contamination.
    if !cfg!(test) {
        dotenvy::dotenv().ok();
    }
}

fn log_level_from_env() -> Result<Level, ConfigError> {
    let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
    log_level_str.parse::<Level>().map_err(|_| {
        ConfigError::InvalidValue(
            "RUST_LOG".to_string(),
            format!("'{}' is not a valid log level", log_level_str),
        )
    })
}
