//! services/api/src/bin/reader.rs

use api_lib::{
    adapters::{FileStore, HttpRelayClient},
    cli::{self, Cli},
    client::{CredentialStore, WallabagClient},
    config::ClientConfig,
    error::ApiError,
};
use clap::Parser;
use reading_list_core::ports::SystemClock;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let args = Cli::parse();

    // --- 1. Load Configuration & Set Up Logging ---
    let mut config = ClientConfig::from_env()?;
    if let Some(relay_url) = args.relay_url {
        config.relay_url = relay_url;
    }
    if let Some(state_dir) = args.state_dir {
        config.state_dir = state_dir;
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!(relay = %config.relay_url, state_dir = %config.state_dir.display(), "Client configuration loaded");

    // --- 2. Open the Stores & Build the Client ---
    let store = Arc::new(CredentialStore::new(
        Arc::new(FileStore::open(config.durable_path())),
        Arc::new(FileStore::open(config.markers_path())),
        Arc::new(SystemClock),
    ));
    let relay = Arc::new(HttpRelayClient::new(
        reqwest::Client::builder().build()?,
        config.relay_url.clone(),
    ));
    let client = WallabagClient::new(store, relay);

    // --- 3. Run the Command ---
    let output = cli::run(args.command, &client).await?;
    println!("{}", output);
    Ok(())
}
