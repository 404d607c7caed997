mod application;
mod config;
mod errors;
mod relay;
mod routes;
mod state;
mod telegram_client;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::relay::message::MessageTemplate;
use crate::relay::Relay;
use crate::routes::build_router;
use crate::state::AppState;
use crate::telegram_client::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values, not on missing credentials)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ariza API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Telegram client
    let telegram = TelegramClient::new(&config.telegram_api_base, config.relay_timeout)?;
    info!(
        "Telegram client initialized (timeout: {}s)",
        config.relay_timeout.as_secs()
    );

    let relay = Relay::new(
        config.relay_config(),
        Arc::new(telegram),
        MessageTemplate::standard(config.message_layout),
    );
    if !relay.is_configured() {
        warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set; submissions will fail with 500");
    }

    let app = build_router(AppState { relay });

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
