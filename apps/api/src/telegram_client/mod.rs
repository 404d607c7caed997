/// Telegram client: the single point of entry for Bot API calls.
///
/// No other module talks to api.telegram.org directly; the relay goes
/// through the `MessageSender` trait so delivery can be stubbed in tests.
///
/// The bot token is part of the request URL. It must never be logged.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const PARSE_MODE_HTML: &str = "HTML";

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Destination chat: numeric id, or a public channel name such as `@news`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChatId {
    Numeric(i64),
    Name(String),
}

impl ChatId {
    /// `-?[0-9]+` that fits in an i64 is numeric; anything else is sent
    /// through unchanged.
    pub fn parse(raw: &str) -> Self {
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<i64>() {
                return ChatId::Numeric(id);
            }
        }
        ChatId::Name(raw.to_string())
    }
}

/// Forum thread ids are positive integers; anything else is dropped.
pub fn parse_thread_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().filter(|id| *id != 0)
}

/// Body of `sendMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: ChatId,
    pub text: String,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
}

impl SendMessageRequest {
    pub fn html(chat_id: ChatId, text: String, message_thread_id: Option<i64>) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: PARSE_MODE_HTML,
            disable_web_page_preview: true,
            message_thread_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

/// Decoded Bot API reply body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    /// `{"ok": true, ...}`
    Accepted,
    /// `{"ok": false, "description"?: ..., "error_code"?: ...}`
    Rejected {
        description: Option<String>,
        error_code: Option<i64>,
    },
    /// Empty body, invalid JSON, or a shape without a boolean `ok`.
    Unrecognized,
}

impl ApiReply {
    /// Never fails: anything that is not a recognisable envelope is
    /// `Unrecognized`.
    pub fn decode(body: &[u8]) -> Self {
        match serde_json::from_slice::<ReplyEnvelope>(body) {
            Ok(ReplyEnvelope { ok: true, .. }) => ApiReply::Accepted,
            Ok(ReplyEnvelope {
                ok: false,
                description,
                error_code,
            }) => ApiReply::Rejected {
                description,
                error_code,
            },
            Err(_) => ApiReply::Unrecognized,
        }
    }
}

/// HTTP status plus decoded body of one `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReply {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty when unknown.
    pub status_text: String,
    pub body: ApiReply,
}

impl DeliveryReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Sends one message. Implementations make exactly one attempt.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        bot_token: &str,
        request: &SendMessageRequest,
    ) -> Result<DeliveryReply, TelegramError>;
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, TelegramError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send_message(
        &self,
        bot_token: &str,
        request: &SendMessageRequest,
    ) -> Result<DeliveryReply, TelegramError> {
        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        // Failing to read the body (timeout, dropped connection) is a transport
        // error; a complete body that does not parse decodes as Unrecognized.
        let bytes = response.bytes().await.map_err(|e| {
            debug!("Failed to read sendMessage body (status {}): {}", status, e);
            classify(e)
        })?;
        let body = ApiReply::decode(&bytes);

        debug!("sendMessage returned {}: {:?}", status, body);

        Ok(DeliveryReply {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

fn classify(e: reqwest::Error) -> TelegramError {
    if e.is_timeout() {
        TelegramError::Timeout
    } else {
        // Strip the URL so the token cannot leak through Display.
        TelegramError::Http(e.without_url())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use serde_json::{json, Value};

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn stub_api(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> SendMessageRequest {
        SendMessageRequest::html(ChatId::Numeric(-100123), "hi".to_string(), None)
    }

    #[test]
    fn test_chat_id_numeric() {
        assert_eq!(ChatId::parse("123456"), ChatId::Numeric(123456));
        assert_eq!(ChatId::parse("-100123456"), ChatId::Numeric(-100123456));
    }

    #[test]
    fn test_chat_id_name_passthrough() {
        assert_eq!(ChatId::parse("mychannel"), ChatId::Name("mychannel".to_string()));
        assert_eq!(ChatId::parse("@jobs"), ChatId::Name("@jobs".to_string()));
        assert_eq!(ChatId::parse("-"), ChatId::Name("-".to_string()));
        assert_eq!(ChatId::parse("12a"), ChatId::Name("12a".to_string()));
    }

    #[test]
    fn test_chat_id_overflow_stays_opaque() {
        let huge = "99999999999999999999999";
        assert_eq!(ChatId::parse(huge), ChatId::Name(huge.to_string()));
    }

    #[test]
    fn test_thread_id() {
        assert_eq!(parse_thread_id("42"), Some(42));
        assert_eq!(parse_thread_id("0"), None);
        assert_eq!(parse_thread_id("-5"), None);
        assert_eq!(parse_thread_id("general"), None);
        assert_eq!(parse_thread_id(""), None);
    }

    #[test]
    fn test_request_serialization_omits_missing_thread() {
        let value = serde_json::to_value(request()).unwrap();
        assert_eq!(
            value,
            json!({
                "chat_id": -100123,
                "text": "hi",
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            })
        );

        let named = SendMessageRequest::html(ChatId::Name("@jobs".into()), "hi".into(), Some(7));
        let value = serde_json::to_value(named).unwrap();
        assert_eq!(value["chat_id"], json!("@jobs"));
        assert_eq!(value["message_thread_id"], json!(7));
    }

    #[test]
    fn test_decode_reply_variants() {
        assert_eq!(ApiReply::decode(br#"{"ok":true,"result":{}}"#), ApiReply::Accepted);
        assert_eq!(
            ApiReply::decode(br#"{"ok":false,"error_code":400,"description":"chat not found"}"#),
            ApiReply::Rejected {
                description: Some("chat not found".to_string()),
                error_code: Some(400),
            }
        );
        assert_eq!(
            ApiReply::decode(br#"{"ok":false}"#),
            ApiReply::Rejected {
                description: None,
                error_code: None,
            }
        );
    }

    #[test]
    fn test_decode_lenient_fallback() {
        assert_eq!(ApiReply::decode(b""), ApiReply::Unrecognized);
        assert_eq!(ApiReply::decode(b"<html>oops</html>"), ApiReply::Unrecognized);
        assert_eq!(ApiReply::decode(br#"{"result":1}"#), ApiReply::Unrecognized);
        assert_eq!(ApiReply::decode(br#"{"ok":"yes"}"#), ApiReply::Unrecognized);
        assert_eq!(
            ApiReply::decode(br#"{"ok":false,"description":17}"#),
            ApiReply::Unrecognized
        );
    }

    #[tokio::test]
    async fn test_send_message_posts_payload() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Value>();
        let router = Router::new().route(
            "/botTESTTOKEN/sendMessage",
            post(move |axum::Json(body): axum::Json<Value>| {
                let tx = tx.clone();
                async move {
                    tx.send(body).unwrap();
                    axum::Json(json!({ "ok": true, "result": { "message_id": 1 } }))
                }
            }),
        );
        let base = stub_api(router).await;
        let client = TelegramClient::new(&format!("{base}/"), Duration::from_secs(5)).unwrap();

        let reply = client.send_message("TESTTOKEN", &request()).await.unwrap();

        assert_eq!(reply.status, 200);
        assert!(reply.is_success());
        assert_eq!(reply.body, ApiReply::Accepted);
        let received = rx.recv().await.unwrap();
        assert_eq!(received["chat_id"], json!(-100123));
        assert_eq!(received["parse_mode"], json!("HTML"));
    }

    #[tokio::test]
    async fn test_send_message_server_error_unparseable_body() {
        let router = Router::new().route(
            "/botT/sendMessage",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );
        let base = stub_api(router).await;
        let client = TelegramClient::new(&base, Duration::from_secs(5)).unwrap();

        let reply = client.send_message("T", &request()).await.unwrap();

        assert_eq!(reply.status, 500);
        assert_eq!(reply.status_text, "Internal Server Error");
        assert!(reply.is_server_error());
        assert_eq!(reply.body, ApiReply::Unrecognized);
    }

    #[tokio::test]
    async fn test_send_message_timeout() {
        let router = Router::new().route(
            "/botT/sendMessage",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = stub_api(router).await;
        let client = TelegramClient::new(&base, Duration::from_millis(100)).unwrap();

        let err = client.send_message("T", &request()).await.unwrap_err();
        assert!(matches!(err, TelegramError::Timeout));
    }

    /// Sends 2xx headers and a partial body, then stalls past the client timeout.
    pub(crate) async fn stalling_api() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"ok\":",
                )
                .await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_send_message_body_stall_is_transport_error() {
        let base = stalling_api().await;
        let client = TelegramClient::new(&base, Duration::from_millis(300)).unwrap();

        let err = client.send_message("T", &request()).await.unwrap_err();
        assert!(matches!(err, TelegramError::Timeout | TelegramError::Http(_)));
    }

    #[tokio::test]
    async fn test_send_message_unreachable() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = TelegramClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();

        let err = client.send_message("SECRET", &request()).await.unwrap_err();
        assert!(matches!(err, TelegramError::Http(_)));
        assert!(!err.to_string().contains("SECRET"));
    }
}
