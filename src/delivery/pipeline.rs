//! Delivery pipeline
//!
//! Sequential two-call orchestration over a finished transcript: summarize
//! with quota-aware retry, then notify. Single-flight per pipeline value,
//! every step logged through the rotating sink, and no failure ever
//! propagates to the caller — the caller only sees a status string.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::delivery::DeliveryServices;
use crate::error::{AppError, Result};
use crate::logsink::RotatingLog;
use crate::storage::{queries, DeliveryConfig, Store};

/// Maximum number of retries after the first summarization attempt.
pub const MAX_RETRIES: u32 = 3;

const BUSY_STATUS: &str = "Already processing... please wait.";
const CONFIG_MISSING_STATUS: &str = "Error: Config missing. Please check settings.";
const SENDING_STATUS: &str = "Sending to Gemini...";
const SUCCESS_STATUS: &str = "Summary sent to Telegram!";

/// Clears the in-flight flag on every exit path, panics included.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct DeliveryPipeline<S> {
    services: S,
    store: Arc<Store>,
    log: RotatingLog,
    busy: AtomicBool,
}

impl<S: DeliveryServices> DeliveryPipeline<S> {
    pub fn new(services: S, store: Arc<Store>) -> Self {
        let log = RotatingLog::new(store.clone());
        Self {
            services,
            store,
            log,
            busy: AtomicBool::new(false),
        }
    }

    pub fn log(&self) -> &RotatingLog {
        &self.log
    }

    /// Run the full pipeline for one transcript and return the final status.
    pub async fn deliver(&self, transcript: &str) -> String {
        self.deliver_with_progress(transcript, |_| {}).await
    }

    /// Like [`deliver`](Self::deliver), reporting intermediate statuses
    /// through `progress`. The transport layer answers the host with the
    /// first reported status; anything after that is only visible in the
    /// log.
    pub async fn deliver_with_progress(
        &self,
        transcript: &str,
        progress: impl FnMut(&str),
    ) -> String {
        // A call arriving while another delivery is in flight must not
        // touch the log or the in-flight state.
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("deliver() rejected: already processing");
            return BUSY_STATUS.to_string();
        }
        let _guard = BusyGuard(&self.busy);

        self.run(transcript, progress).await
    }

    async fn run(&self, transcript: &str, mut progress: impl FnMut(&str)) -> String {
        self.log.append("Starting summarization...");

        let config = match self.store.with_conn(queries::load_delivery_config) {
            Ok(config) => config,
            Err(e) => {
                error!("Delivery aborted: {e}");
                self.log.append(&format!("{CONFIG_MISSING_STATUS} ({e})"));
                progress(CONFIG_MISSING_STATUS);
                return CONFIG_MISSING_STATUS.to_string();
            }
        };

        self.log
            .append(&format!("Transcript length: {}", transcript.len()));
        progress(SENDING_STATUS);
        self.log.append(&format!(
            "Sending to Gemini ({})...",
            self.services.model_name()
        ));

        let summary = match self.summarize_with_retry(&config, transcript).await {
            Ok(summary) => summary,
            Err(e) => return self.fail(&e),
        };
        self.log
            .append(&format!("Gemini success. Summary length: {}", summary.len()));

        self.log
            .append(&format!("Sending to Telegram ({})...", config.chat_id));
        if let Err(e) = self.services.notify(&config, &summary).await {
            return self.fail(&e);
        }
        self.log.append("Telegram sent successfully!");

        info!("Delivery complete");
        progress(SUCCESS_STATUS);
        SUCCESS_STATUS.to_string()
    }

    /// Summarization with exponential backoff on quota failures.
    ///
    /// Up to `MAX_RETRIES + 1` attempts; waits 2s, 4s, 8s between them.
    /// Non-quota failures are never retried. An unresolvable model triggers
    /// a model-listing diagnostic before the failure is returned; the
    /// diagnostic does not consume an attempt.
    async fn summarize_with_retry(
        &self,
        config: &DeliveryConfig,
        transcript: &str,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.services.summarize(config, transcript).await {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    if matches!(e, AppError::ModelUnresolvable(_)) {
                        self.log_available_models(config).await;
                        return Err(e);
                    }
                    if e.is_quota() && attempt < MAX_RETRIES {
                        let delay = Duration::from_secs(1u64 << (attempt + 1));
                        self.log.append(&format!(
                            "Quota hit (429). Retrying in {}s... (Attempt {}/{})",
                            delay.as_secs(),
                            attempt + 1,
                            MAX_RETRIES
                        ));
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn log_available_models(&self, config: &DeliveryConfig) {
        self.log.append("Model not found. Listing models...");
        match self.services.list_models(config).await {
            Ok(names) => self
                .log
                .append(&format!("AVAILABLE MODELS: {}", names.join(", "))),
            Err(e) => self.log.append(&format!("Failed to list models: {e}")),
        }
    }

    fn fail(&self, e: &AppError) -> String {
        error!("Delivery failed: {e}");
        self.log.append(&format!("CRITICAL ERROR: {e}"));
        format!("Error: {e}")
    }
}
