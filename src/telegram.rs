//! Message delivery to Telegram.
//!
//! The digest is handed to a [`MessageSink`]; in production that is
//! [`TelegramSink`], a thin wrapper over the Bot API `sendMessage`
//! method. Delivery failures are the caller's to log; messages are not
//! queued for redelivery, and a failed send never crashes the run.
//! [`NoopSink`] stands in when credentials are missing so the rest of the
//! pipeline behaves identically.

use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to the message sink failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("message sink rejected the payload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers one formatted digest to the fixed destination.
pub trait MessageSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Telegram Bot API sink.
#[derive(Debug, Clone)]
pub struct TelegramSink {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(client: reqwest::Client, bot_token: &str, chat_id: &str) -> Self {
        Self {
            client,
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }
}

impl MessageSink for TelegramSink {
    #[instrument(level = "info", skip_all, fields(chat_id = %self.chat_id))]
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(bytes = text.len(), "Digest delivered");
        Ok(())
    }
}

/// Sink used when Telegram credentials are not configured: the digest is
/// dropped with a warning instead of crashing the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MessageSink for NoopSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        warn!(
            bytes = text.len(),
            "Telegram credentials missing; digest not sent"
        );
        Ok(())
    }
}
