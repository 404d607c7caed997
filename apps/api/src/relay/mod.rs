// Relay: renders a validated application and forwards it to the Telegram chat.
// One delivery attempt per submission; failures are surfaced, never queued.

pub mod message;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::application::models::ApplicationRecord;
use crate::relay::message::MessageTemplate;
use crate::telegram_client::{
    parse_thread_id, ApiReply, ChatId, DeliveryReply, MessageSender, SendMessageRequest,
};

pub const MISSING_CONFIGURATION: &str = "missing configuration";
pub const TRANSPORT_FAILURE: &str = "failed to reach messaging API";
const GENERIC_REJECTION: &str = "Telegram error";

/// Credentials and routing for the destination chat.
#[derive(Debug, Clone, Default)]
pub struct RelayConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub thread_id: Option<String>,
}

impl RelayConfig {
    pub fn is_complete(&self) -> bool {
        present(&self.bot_token).is_some() && present(&self.chat_id).is_some()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Success,
    Failure {
        reason: String,
        /// Status the HTTP boundary should answer with.
        http_status_hint: u16,
    },
}

impl RelayOutcome {
    fn failure(reason: impl Into<String>, http_status_hint: u16) -> Self {
        RelayOutcome::Failure {
            reason: reason.into(),
            http_status_hint,
        }
    }
}

#[derive(Clone)]
pub struct Relay {
    config: RelayConfig,
    sender: Arc<dyn MessageSender>,
    template: MessageTemplate,
}

impl Relay {
    pub fn new(config: RelayConfig, sender: Arc<dyn MessageSender>, template: MessageTemplate) -> Self {
        Self {
            config,
            sender,
            template,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_complete()
    }

    pub async fn submit(&self, record: &ApplicationRecord) -> RelayOutcome {
        let (Some(bot_token), Some(raw_chat_id)) =
            (present(&self.config.bot_token), present(&self.config.chat_id))
        else {
            // Which of the two values is absent stays out of the response.
            error!(
                has_token = present(&self.config.bot_token).is_some(),
                has_chat_id = present(&self.config.chat_id).is_some(),
                "Relay is not configured"
            );
            return RelayOutcome::failure(MISSING_CONFIGURATION, 500);
        };

        let request = SendMessageRequest::html(
            ChatId::parse(raw_chat_id),
            self.template.render(record),
            present(&self.config.thread_id).and_then(parse_thread_id),
        );

        match self.sender.send_message(bot_token, &request).await {
            Ok(reply) => {
                let outcome = map_reply(&reply);
                match &outcome {
                    RelayOutcome::Success => info!(status = reply.status, "Application delivered"),
                    RelayOutcome::Failure { reason, .. } => warn!(
                        status = reply.status,
                        error_code = ?error_code(&reply.body),
                        "sendMessage rejected: {}",
                        reason
                    ),
                }
                outcome
            }
            Err(e) => {
                error!("sendMessage transport failure: {}", e);
                RelayOutcome::failure(TRANSPORT_FAILURE, 502)
            }
        }
    }
}

/// Translates a Bot API reply into an outcome.
///
/// - non-2xx: remote description if any, else a message naming the status;
///   5xx maps to 502, everything else to 400.
/// - 2xx with `ok: false`: logical failure, 400.
/// - 2xx otherwise, including an unrecognised body: success.
pub fn map_reply(reply: &DeliveryReply) -> RelayOutcome {
    if !reply.is_success() {
        let reason = match &reply.body {
            ApiReply::Rejected {
                description: Some(description),
                ..
            } => description.clone(),
            ApiReply::Rejected { .. } => format!("{} (status {})", GENERIC_REJECTION, reply.status),
            _ if reply.status_text.is_empty() => {
                format!("{} (status {})", GENERIC_REJECTION, reply.status)
            }
            _ => format!(
                "{} (status {} {})",
                GENERIC_REJECTION, reply.status, reply.status_text
            ),
        };
        let hint = if reply.is_server_error() { 502 } else { 400 };
        return RelayOutcome::failure(reason, hint);
    }

    match &reply.body {
        ApiReply::Rejected { description, .. } => RelayOutcome::failure(
            description.clone().unwrap_or_else(|| GENERIC_REJECTION.to_string()),
            400,
        ),
        ApiReply::Accepted | ApiReply::Unrecognized => RelayOutcome::Success,
    }
}

fn error_code(body: &ApiReply) -> Option<i64> {
    match body {
        ApiReply::Rejected { error_code, .. } => *error_code,
        _ => None,
    }
}
