//! Telegram notification client

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(http: reqwest::Client, token: &str, chat_id: &str) -> Self {
        Self {
            http,
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    /// Send one message to the configured chat. Not retried: any failure is
    /// terminal for the delivery attempt.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{API_BASE}/bot{}/sendMessage", self.token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "Markdown",
        };

        debug!("Sending Telegram message to chat {}", self.chat_id);
        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AppError::Service(format!("Telegram network {status}")));
        }

        let parsed: SendMessageResponse = response.json().await?;
        if !parsed.ok {
            return Err(AppError::Service(format!(
                "Telegram API: {}",
                parsed.description.unwrap_or_else(|| "unknown error".into())
            )));
        }

        Ok(())
    }
}
