//! Capture session lifecycle
//!
//! Orchestrates batcher -> filter -> merger over the lifetime of one
//! recording. The session owns a background task holding the transcript;
//! `start` spawns it with fresh state, `stop` tears it down and hands the
//! accumulated transcript back as one newline-delimited string.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::capture::batcher::{CaptionNode, MutationBatcher, DEBOUNCE};
use crate::capture::filter;
use crate::capture::merger::LineMerger;

/// The caption surface never attributes speakers.
const SPEAKER: &str = "Unknown";

/// Sleep horizon for the session loop when no batch is pending.
const IDLE_TICK: Duration = Duration::from_secs(3600);

/// Visible recording indicator, an external collaborator of the session.
pub trait RecordingIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// Default indicator that only logs the state changes.
pub struct LogIndicator;

impl RecordingIndicator for LogIndicator {
    fn show(&self) {
        info!("Recording indicator shown");
    }

    fn hide(&self) {
        info!("Recording indicator hidden");
    }
}

enum SessionMsg {
    Node(Arc<CaptionNode>),
    Stop(oneshot::Sender<String>),
}

struct Running {
    tx: mpsc::UnboundedSender<SessionMsg>,
    task: JoinHandle<()>,
}

/// Idle/Recording state machine over the capture engine.
pub struct CaptureSession {
    indicator: Arc<dyn RecordingIndicator>,
    debounce: Duration,
    running: Option<Running>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::with_indicator(Arc::new(LogIndicator))
    }

    pub fn with_indicator(indicator: Arc<dyn RecordingIndicator>) -> Self {
        Self {
            indicator,
            debounce: DEBOUNCE,
            running: None,
        }
    }

    /// Override the debounce interval (replay tooling and tests).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn is_recording(&self) -> bool {
        self.running.is_some()
    }

    /// Begin a recording. No-op when already recording.
    ///
    /// Transcript and window state from any earlier recording is discarded;
    /// the capture task starts empty.
    pub fn start(&mut self) {
        if self.running.is_some() {
            debug!("start() ignored: already recording");
            return;
        }

        info!("Capture session started");
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(capture_task(rx, self.debounce));
        self.running = Some(Running { tx, task });
        self.indicator.show();
    }

    /// Route one content-change event into the engine.
    ///
    /// While idle there is no capture task and no channel; events are
    /// dropped without any work.
    pub fn observe(&self, node: Arc<CaptionNode>) {
        if let Some(running) = &self.running {
            let _ = running.tx.send(SessionMsg::Node(node));
        }
    }

    /// End the recording and return the transcript accumulated so far.
    ///
    /// Returns `None` when the session is idle. The capture boundary is
    /// strict: a batch whose debounce timer has not fired yet is discarded,
    /// its fragments never reach the transcript.
    pub async fn stop(&mut self) -> Option<String> {
        let running = self.running.take()?;
        self.indicator.hide();

        let (reply_tx, reply_rx) = oneshot::channel();
        let transcript = if running.tx.send(SessionMsg::Stop(reply_tx)).is_ok() {
            reply_rx.await.unwrap_or_default()
        } else {
            warn!("Capture task gone before stop; returning empty transcript");
            String::new()
        };
        let _ = running.task.await;

        info!("Capture session stopped ({} chars)", transcript.len());
        Some(transcript)
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Background loop: debounce incoming node events, then push each drained
/// batch through filter and merger in snapshot order.
async fn capture_task(mut rx: mpsc::UnboundedReceiver<SessionMsg>, debounce: Duration) {
    let mut batcher = MutationBatcher::with_debounce(debounce);
    let mut merger = LineMerger::new();

    loop {
        let deadline = batcher.deadline();
        let sleep_target = deadline.unwrap_or_else(|| Instant::now() + IDLE_TICK);

        tokio::select! {
            msg = rx.recv() => match msg {
                Some(SessionMsg::Node(node)) => batcher.enqueue(node),
                Some(SessionMsg::Stop(reply)) => {
                    if !batcher.is_empty() {
                        debug!(
                            "Discarding {} pending node(s) at stop boundary",
                            batcher.len()
                        );
                    }
                    let _ = reply.send(merger.join());
                    break;
                }
                None => break,
            },
            _ = tokio::time::sleep_until(sleep_target), if deadline.is_some() => {
                // One scheduler yield before draining, so a long batch never
                // extends the timer callback itself.
                tokio::task::yield_now().await;
                let batch = batcher.take_batch();
                drain_batch(&mut merger, &batch);
            }
        }
    }
}

fn drain_batch(merger: &mut LineMerger, batch: &[Arc<CaptionNode>]) {
    debug!("Draining batch of {} node(s)", batch.len());
    for node in batch {
        let text = node.text();
        if filter::should_keep(&text, node.tag()) {
            merger.merge(SPEAKER, text.trim());
        }
    }
}
