//! Mutation batching (trailing debounce)
//!
//! The caption surface fires content-change notifications at a much higher
//! rate than the merge engine should run. The batcher collects the affected
//! nodes, deduplicated by identity, and only releases a batch after a quiet
//! period: every new event pushes the deadline out, so a continuous burst
//! drains exactly once, when it settles.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Quiet period before a pending batch is released.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// An opaque content-bearing node of the host surface.
///
/// The host mutates the text at any time; the capture engine reads it when
/// the batch containing the node is drained, not when the event arrived.
#[derive(Debug)]
pub struct CaptionNode {
    id: u64,
    tag: String,
    text: Mutex<String>,
}

impl CaptionNode {
    pub fn new(id: u64, tag: impl Into<String>, text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id,
            tag: tag.into(),
            text: Mutex::new(text.into()),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Current text content, as of the moment of the call.
    pub fn text(&self) -> String {
        self.text.lock().clone()
    }

    /// Host-side mutation of the node content.
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.lock() = text.into();
    }
}

/// Pending-node set with a trailing-debounce deadline.
pub struct MutationBatcher {
    pending: Vec<Arc<CaptionNode>>,
    seen: HashSet<u64>,
    deadline: Option<Instant>,
    debounce: Duration,
}

impl MutationBatcher {
    pub fn new() -> Self {
        Self::with_debounce(DEBOUNCE)
    }

    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            pending: Vec::new(),
            seen: HashSet::new(),
            deadline: None,
            debounce,
        }
    }

    /// Record a "content possibly changed" event for a node.
    ///
    /// Insertion is idempotent per node identity, but every event restarts
    /// the deadline, including repeats of an already-pending node.
    pub fn enqueue(&mut self, node: Arc<CaptionNode>) {
        if self.seen.insert(node.id()) {
            self.pending.push(node);
        }
        self.deadline = Some(Instant::now() + self.debounce);
    }

    /// Deadline the session loop should sleep until, if a batch is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Snapshot the pending set in insertion order and empty it.
    pub fn take_batch(&mut self) -> Vec<Arc<CaptionNode>> {
        self.seen.clear();
        self.deadline = None;
        std::mem::take(&mut self.pending)
    }
}

impl Default for MutationBatcher {
    fn default() -> Self {
        Self::new()
    }
}
