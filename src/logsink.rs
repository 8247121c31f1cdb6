//! Rotating debug log
//!
//! Bounded, newest-first log buffer shared by every delivery step and
//! readable from the UI surface. Appends must never fail the caller:
//! persistence problems are reported on the tracing channel and swallowed.

use std::sync::Arc;

use tracing::error;

use crate::storage::{self, Store};

/// Hard cap on the persisted buffer, in characters.
pub const MAX_LOG_CHARS: usize = 10_000;

/// Prepend-ordered log buffer persisted in the store.
#[derive(Clone)]
pub struct RotatingLog {
    store: Arc<Store>,
    max_chars: usize,
}

impl RotatingLog {
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_capacity(store, MAX_LOG_CHARS)
    }

    pub fn with_capacity(store: Arc<Store>, max_chars: usize) -> Self {
        Self { store, max_chars }
    }

    /// Prepend a timestamped entry and persist the truncated buffer.
    ///
    /// Newest-first ordering means the truncation always drops the oldest
    /// content off the tail.
    pub fn append(&self, line: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let entry = format!("[{timestamp}] {line}\n");

        let result = self.store.with_conn(|conn| {
            let old = storage::get_log_buffer(conn)?;
            let mut buffer = entry.clone() + &old;
            if let Some((idx, _)) = buffer.char_indices().nth(self.max_chars) {
                buffer.truncate(idx);
            }
            storage::set_log_buffer(conn, &buffer)
        });

        if let Err(e) = result {
            error!("Failed to save log entry: {e}");
        }
    }

    /// Current buffer; empty string when nothing has been logged.
    pub fn read(&self) -> String {
        match self.store.with_conn(storage::get_log_buffer) {
            Ok(buffer) => buffer,
            Err(e) => {
                error!("Failed to read log buffer: {e}");
                String::new()
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.with_conn(|conn| storage::set_log_buffer(conn, "")) {
            error!("Failed to clear log buffer: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with_capacity(max_chars: usize) -> RotatingLog {
        let store = Arc::new(Store::open_in_memory().unwrap());
        RotatingLog::with_capacity(store, max_chars)
    }

    #[test]
    fn test_newest_entry_first() {
        let log = log_with_capacity(MAX_LOG_CHARS);
        log.append("first");
        log.append("second");

        let buffer = log.read();
        let first_pos = buffer.find("second").unwrap();
        let second_pos = buffer.find("first").unwrap();
        assert!(first_pos < second_pos);
        // Every entry carries the [HH:MM:SS] prefix.
        assert!(buffer.starts_with('['));
        assert_eq!(buffer.matches('\n').count(), 2);
    }

    #[test]
    fn test_rotation_drops_oldest_content() {
        // Each entry is "[HH:MM:SS] entry N\n" = 19 chars.
        let log = log_with_capacity(45);
        log.append("entry 1");
        log.append("entry 2");
        log.append("entry 3");

        let buffer = log.read();
        assert!(buffer.chars().count() <= 45);
        assert!(buffer.contains("entry 3"));
        assert!(buffer.contains("entry 2"));
        assert!(!buffer.contains("entry 1"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let log = log_with_capacity(15);
        log.append("эта строка длинная");
        let buffer = log.read();
        assert_eq!(buffer.chars().count(), 15);
    }

    #[test]
    fn test_clear() {
        let log = log_with_capacity(MAX_LOG_CHARS);
        log.append("something");
        log.clear();
        assert_eq!(log.read(), "");
    }
}
