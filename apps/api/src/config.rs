use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::relay::message::MessageLayout;
use crate::relay::RelayConfig;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Application configuration loaded from environment variables.
/// Telegram credentials are optional at startup: a missing token or chat id
/// is reported per request, not as a startup failure.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub telegram_thread_id: Option<String>,
    pub telegram_api_base: String,
    pub relay_timeout: Duration,
    pub message_layout: MessageLayout,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let relay_timeout = match optional_env("RELAY_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("RELAY_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if relay_timeout == 0 {
            bail!("RELAY_TIMEOUT_SECS must be greater than zero");
        }

        let message_layout = match optional_env("MESSAGE_LAYOUT") {
            Some(raw) => raw.parse::<MessageLayout>()?,
            None => MessageLayout::Compact,
        };

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            telegram_bot_token: optional_env("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: optional_env("TELEGRAM_CHAT_ID"),
            telegram_thread_id: optional_env("TELEGRAM_THREAD_ID"),
            telegram_api_base: optional_env("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            relay_timeout: Duration::from_secs(relay_timeout),
            message_layout,
        })
    }

    /// The subset of configuration the relay is constructed with.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            bot_token: self.telegram_bot_token.clone(),
            chat_id: self.telegram_chat_id.clone(),
            thread_id: self.telegram_thread_id.clone(),
        }
    }
}

/// Reads a variable, trimmed. Unset and blank are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
