use serde::{Deserialize, Serialize};

/// The three credentials required before any delivery attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryConfig {
    /// Gemini API key.
    pub gemini_key: String,
    /// Telegram bot token.
    pub telegram_token: String,
    /// Telegram destination chat id.
    pub chat_id: String,
}
