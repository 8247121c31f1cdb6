pub mod gemini;
pub mod pipeline;
pub mod telegram;

pub use gemini::{GeminiClient, DEFAULT_MODEL};
pub use pipeline::{DeliveryPipeline, MAX_RETRIES};
pub use telegram::TelegramClient;

use crate::error::Result;
use crate::storage::DeliveryConfig;

/// Boundary to the two external delivery services.
///
/// Credentials are passed per call since the store can change between
/// deliveries. The pipeline is generic over this trait so the retry and
/// single-flight logic is testable without a network.
#[allow(async_fn_in_trait)]
pub trait DeliveryServices: Send + Sync {
    /// Model identifier used for summarization, for log entries.
    fn model_name(&self) -> &str {
        DEFAULT_MODEL
    }

    /// Produce a summary of the transcript.
    async fn summarize(&self, config: &DeliveryConfig, transcript: &str) -> Result<String>;

    /// Diagnostic listing of the model identifiers the service offers.
    async fn list_models(&self, config: &DeliveryConfig) -> Result<Vec<String>>;

    /// Push the summary to the notification destination.
    async fn notify(&self, config: &DeliveryConfig, summary: &str) -> Result<()>;
}

/// Production implementation backed by the Gemini and Telegram HTTP APIs.
pub struct HttpServices {
    http: reqwest::Client,
    model: String,
}

impl HttpServices {
    pub fn new() -> Self {
        Self::with_model(DEFAULT_MODEL)
    }

    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            model: model.into(),
        }
    }
}

impl Default for HttpServices {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryServices for HttpServices {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, config: &DeliveryConfig, transcript: &str) -> Result<String> {
        GeminiClient::new(self.http.clone(), &config.gemini_key, &self.model)
            .summarize(transcript)
            .await
    }

    async fn list_models(&self, config: &DeliveryConfig) -> Result<Vec<String>> {
        GeminiClient::new(self.http.clone(), &config.gemini_key, &self.model)
            .list_models()
            .await
    }

    async fn notify(&self, config: &DeliveryConfig, summary: &str) -> Result<()> {
        TelegramClient::new(self.http.clone(), &config.telegram_token, &config.chat_id)
            .send_message(summary)
            .await
    }
}
