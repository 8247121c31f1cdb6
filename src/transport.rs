//! Host message transport boundary
//!
//! Request/response envelopes exchanged with the host surface, and the
//! dispatcher wiring them to the capture session and delivery pipeline.
//! The host transport itself (who carries these envelopes) stays external.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::capture::{CaptionNode, CaptureSession};
use crate::delivery::{DeliveryPipeline, DeliveryServices};

/// Returned by the log read surface when nothing has been logged.
pub const NO_LOGS_SENTINEL: &str = "No logs yet.";

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Request {
    Start,
    Stop,
    Summarize { transcript: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl Response {
    fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            transcript: None,
        }
    }
}

/// Routes host requests to the session and pipeline.
pub struct Dispatcher<S> {
    session: tokio::sync::Mutex<CaptureSession>,
    pipeline: DeliveryPipeline<S>,
}

impl<S: DeliveryServices> Dispatcher<S> {
    pub fn new(session: CaptureSession, pipeline: DeliveryPipeline<S>) -> Self {
        Self {
            session: tokio::sync::Mutex::new(session),
            pipeline,
        }
    }

    /// Handle one request envelope.
    ///
    /// `summarize` answers with the first status the pipeline reports,
    /// matching the host's single optimistic response; the rest of the run
    /// is observable only through the log surface.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Start => {
                self.session.lock().await.start();
                Response::status("started")
            }
            Request::Stop => {
                let transcript = self.session.lock().await.stop().await.unwrap_or_default();
                Response {
                    status: "stopped".into(),
                    transcript: Some(transcript),
                }
            }
            Request::Summarize { transcript } => {
                info!("Summarize requested ({} chars)", transcript.len());
                let first_status: Mutex<Option<String>> = Mutex::new(None);
                let final_status = self
                    .pipeline
                    .deliver_with_progress(&transcript, |status| {
                        let mut first = first_status.lock();
                        if first.is_none() {
                            *first = Some(status.to_string());
                        }
                    })
                    .await;
                Response::status(first_status.into_inner().unwrap_or(final_status))
            }
        }
    }

    /// Route one caption mutation event into the active session.
    pub async fn observe(&self, node: Arc<CaptionNode>) {
        self.session.lock().await.observe(node);
    }

    // Log read/write surface for the host UI.

    pub fn read_logs(&self) -> String {
        let buffer = self.pipeline.log().read();
        if buffer.is_empty() {
            NO_LOGS_SENTINEL.to_string()
        } else {
            buffer
        }
    }

    pub fn clear_logs(&self) {
        self.pipeline.log().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::storage::{DeliveryConfig, Store};
    use crate::{capture::DEBOUNCE, storage::queries};
    use std::time::Duration;

    struct OkServices;

    impl DeliveryServices for OkServices {
        async fn summarize(&self, _config: &DeliveryConfig, transcript: &str) -> Result<String> {
            Ok(format!("summary of {} chars", transcript.len()))
        }

        async fn list_models(&self, _config: &DeliveryConfig) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn notify(&self, _config: &DeliveryConfig, _summary: &str) -> Result<()> {
            Ok(())
        }
    }

    fn dispatcher(store: Arc<Store>) -> Dispatcher<OkServices> {
        Dispatcher::new(
            CaptureSession::new(),
            DeliveryPipeline::new(OkServices, store),
        )
    }

    fn configured_store() -> Arc<Store> {
        let store = Arc::new(Store::open_in_memory().unwrap());
        store
            .with_conn(|conn| {
                queries::set_value(conn, "gemini_key", "k")?;
                queries::set_value(conn, "telegram_token", "t")?;
                queries::set_value(conn, "chat_id", "c")
            })
            .unwrap();
        store
    }

    #[test]
    fn test_request_envelope_parsing() {
        let start: Request = serde_json::from_str(r#"{"action": "start"}"#).unwrap();
        assert!(matches!(start, Request::Start));

        let summarize: Request =
            serde_json::from_str(r#"{"action": "summarize", "transcript": "[Unknown]: hi"}"#)
                .unwrap();
        match summarize {
            Request::Summarize { transcript } => assert_eq!(transcript, "[Unknown]: hi"),
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_response_envelope_shape() {
        let response = Response {
            status: "stopped".into(),
            transcript: Some("[Unknown]: hi".into()),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"status":"stopped","transcript":"[Unknown]: hi"}"#
        );

        // Transcript field is omitted entirely when absent.
        let bare = Response::status("started");
        assert_eq!(serde_json::to_string(&bare).unwrap(), r#"{"status":"started"}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_capture_stop_roundtrip() {
        let dispatcher = dispatcher(configured_store());

        assert_eq!(
            dispatcher.handle(Request::Start).await,
            Response::status("started")
        );
        dispatcher
            .observe(CaptionNode::new(1, "DIV", "hello from the meeting"))
            .await;
        tokio::time::sleep(DEBOUNCE + Duration::from_millis(50)).await;

        let response = dispatcher.handle(Request::Stop).await;
        assert_eq!(response.status, "stopped");
        assert_eq!(
            response.transcript.as_deref(),
            Some("[Unknown]: hello from the meeting")
        );
    }

    #[tokio::test]
    async fn test_stop_while_idle_returns_empty_transcript() {
        let dispatcher = dispatcher(configured_store());
        let response = dispatcher.handle(Request::Stop).await;
        assert_eq!(response.status, "stopped");
        assert_eq!(response.transcript.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_summarize_answers_with_first_status() {
        let dispatcher = dispatcher(configured_store());
        let response = dispatcher
            .handle(Request::Summarize {
                transcript: "[Unknown]: hi".into(),
            })
            .await;
        assert_eq!(response.status, "Sending to Gemini...");
    }

    #[tokio::test]
    async fn test_log_surface() {
        let dispatcher = dispatcher(configured_store());
        assert_eq!(dispatcher.read_logs(), NO_LOGS_SENTINEL);

        dispatcher
            .handle(Request::Summarize {
                transcript: "t".into(),
            })
            .await;
        assert!(dispatcher.read_logs().contains("Telegram sent successfully!"));

        dispatcher.clear_logs();
        assert_eq!(dispatcher.read_logs(), NO_LOGS_SENTINEL);
    }
}
