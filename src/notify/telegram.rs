//! Telegram Bot API delivery.
//!
//! Sends the short list as a Markdown message with one inline button per
//! suggestion (callback data is the suggestion's rank).
//!
//! API docs: https://core.telegram.org/bots/api#sendmessage
//! Auth: bot token embedded in the URL path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::format::format_message;
use super::ResultSink;
use crate::config::TelegramCredentials;
use crate::types::{Recommendation, ScoutError, Universe};

const API_BASE: &str = "https://api.telegram.org";
const SINK_NAME: &str = "telegram";

/// Envelope every Bot API call returns.
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram bot sink.
pub struct TelegramNotifier {
    http: Client,
    credentials: TelegramCredentials,
}

impl TelegramNotifier {
    pub fn new(credentials: TelegramCredentials) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self { http, credentials })
    }

    pub fn chat_id(&self) -> i64 {
        self.credentials.chat_id
    }

    /// `sendMessage` request body.
    fn build_payload(chat_id: i64, recommendation: &Recommendation, universe: &Universe) -> serde_json::Value {
        let text = format_message(recommendation, Some(universe));
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let buttons: Vec<_> = (1..=recommendation.swaps().len())
            .map(|rank| json!([{ "text": rank.to_string(), "callback_data": rank.to_string() }]))
            .collect();
        if !buttons.is_empty() {
            body["reply_markup"] = json!({ "inline_keyboard": buttons });
        }
        body
    }
}

#[async_trait]
impl ResultSink for TelegramNotifier {
    async fn deliver(&self, recommendation: &Recommendation, universe: &Universe) -> Result<()> {
        let url = format!(
            "{API_BASE}/bot{}/sendMessage",
            self.credentials.bot_token.expose_secret()
        );
        let body = Self::build_payload(self.credentials.chat_id, recommendation, universe);
        debug!(chat_id = self.credentials.chat_id, "Sending Telegram message");

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            // Strip the URL: it carries the bot token.
            .map_err(|e| ScoutError::Delivery(format!("Telegram request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ScoutError::Delivery(format!("Telegram API error {status}: {text}")).into());
        }

        let parsed: TelegramResponse = resp
            .json()
            .await
            .context("Failed to parse Telegram response")?;
        if !parsed.ok {
            return Err(ScoutError::Delivery(format!(
                "Telegram rejected message: {}",
                parsed.description.unwrap_or_default()
            ))
            .into());
        }

        info!(
            chat_id = self.credentials.chat_id,
            suggestions = recommendation.swaps().len(),
            "Sent Telegram menu"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        SINK_NAME
    }
}
