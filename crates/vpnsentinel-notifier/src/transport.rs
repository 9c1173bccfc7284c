//! Outbound send / inbound poll abstraction for the chat transport
//! (§4.4). `ChatTransport` is vendor-neutral; [`HttpChatTransport`] is a
//! generic bot-API client (token + chat-id, `sendMessage`/`getUpdates`
//! shaped endpoints) good enough for any bot platform exposing that
//! pattern.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::UpstreamError;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_TIMEOUT: Duration = Duration::from_secs(35);
const POLL_LONG_POLL_SECONDS: u64 = 30;

/// One inbound text message observed by [`ChatTransport::poll_inbound`].
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub update_id: i64,
    pub text: String,
}

/// The notifier's view of a chat transport: send outbound HTML, and
/// long-poll for inbound commands. Implementors own their own
/// rate-limiting against the transport's send quota (§5 ≤ 30 msgs/sec).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, html: &str) -> Result<(), UpstreamError>;
    async fn poll_inbound(&self) -> Result<Vec<InboundMessage>, UpstreamError>;
}

/// A bot-API client speaking the common `sendMessage`/`getUpdates`
/// shape (token in the URL path, chat_id as a send parameter, numeric
/// `update_id` offset for at-most-once delivery).
pub struct HttpChatTransport {
    client: reqwest::Client,
    api_base: String,
    chat_id: String,
    offset: std::sync::atomic::AtomicI64,
}

#[derive(Deserialize)]
struct SendResponse {
    ok: bool,
}

#[derive(Deserialize)]
struct GetUpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<UpdateEnvelope>,
}

#[derive(Deserialize)]
struct UpdateEnvelope {
    update_id: i64,
    #[serde(default)]
    message: Option<MessageEnvelope>,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    #[serde(default)]
    text: Option<String>,
}

impl HttpChatTransport {
    pub fn new(token: &str, chat_id: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(POLL_TIMEOUT)
            .build()
            .expect("reqwest client builds with static TLS config");
        Self {
            client,
            api_base: format!("https://api.telegram.org/bot{token}"),
            chat_id: chat_id.to_string(),
            offset: std::sync::atomic::AtomicI64::new(0),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, html: &str) -> Result<(), UpstreamError> {
        let url = format!("{}/sendMessage", self.api_base);
        let resp = self
            .client
            .post(&url)
            .timeout(SEND_TIMEOUT)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": html,
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            }))
            .send()
            .await?;

        let parsed: SendResponse = resp.json().await?;
        if !parsed.ok {
            return Err(UpstreamError::Protocol("send returned ok=false".into()));
        }
        Ok(())
    }

    async fn poll_inbound(&self) -> Result<Vec<InboundMessage>, UpstreamError> {
        let offset = self.offset.load(std::sync::atomic::Ordering::SeqCst);
        let url = format!("{}/getUpdates", self.api_base);
        let resp = self
            .client
            .get(&url)
            .timeout(POLL_TIMEOUT)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", POLL_LONG_POLL_SECONDS.to_string()),
            ])
            .send()
            .await?;

        let parsed: GetUpdatesResponse = resp.json().await?;
        if !parsed.ok {
            return Err(UpstreamError::Protocol("getUpdates returned ok=false".into()));
        }

        let mut messages = Vec::new();
        let mut max_update_id = offset - 1;
        for update in parsed.result {
            max_update_id = max_update_id.max(update.update_id);
            if let Some(text) = update.message.and_then(|m| m.text) {
                messages.push(InboundMessage {
                    update_id: update.update_id,
                    text,
                });
            }
        }
        if max_update_id >= offset {
            self.offset
                .store(max_update_id + 1, std::sync::atomic::Ordering::SeqCst);
        }
        Ok(messages)
    }
}
