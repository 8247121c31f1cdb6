//! MeetScribe: live caption capture and meeting summary delivery.
//!
//! Two subsystems:
//! - [`capture`]: batches raw content-change events, filters UI noise and
//!   merges jittering caption fragments into a clean ordered transcript;
//! - [`delivery`]: sends a finished transcript to Gemini for summarization
//!   (with quota-aware backoff retry) and pushes the summary to Telegram,
//!   logging every step to a bounded rotating buffer.
//!
//! [`transport`] is the envelope boundary to the host surface; [`storage`]
//! persists credentials and the debug log between invocations.

pub mod capture;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod logsink;
pub mod storage;
pub mod transport;

pub use error::{AppError, Result};
