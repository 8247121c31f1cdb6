pub mod batcher;
pub mod filter;
pub mod merger;
pub mod session;

pub use batcher::{CaptionNode, MutationBatcher, DEBOUNCE};
pub use merger::{LineMerger, MergeAction, TranscriptLine, HISTORY_SIZE};
pub use session::{CaptureSession, RecordingIndicator};
