//! Line merger for jittering caption fragments
//!
//! The live caption surface re-renders lines character by character, repeats
//! them, shortens them and occasionally corrects words mid-stream. The merger
//! decides for every filtered fragment whether it is a duplicate, a grown
//! rendering of the last line, a stale re-render, or genuinely new content,
//! and keeps the transcript clean accordingly.

use std::collections::VecDeque;

use strsim::levenshtein;
use tracing::debug;

/// Capacity of the recency window used for dedup decisions.
pub const HISTORY_SIZE: usize = 10;

/// Similarity is never computed for fragments longer than this (cost bound).
const MAX_SIMILARITY_CHARS: usize = 200;

/// Edit distance below this fraction of the longer length counts as similar.
const SIMILARITY_THRESHOLD: f64 = 0.2;

/// One accepted transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
}

impl TranscriptLine {
    pub fn render(&self) -> String {
        format!("[{}]: {}", self.speaker, self.text)
    }
}

/// Outcome of merging one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    /// Fragment was already captured (duplicate, subset or jitter).
    Dropped,
    /// The transcript line at this index had its text replaced.
    Replaced(usize),
    /// A new transcript line was appended at this index.
    Appended(usize),
}

/// Stateful merger owning the transcript and its recency window.
///
/// The window holds the raw (untagged) text of the most recent distinct
/// lines and stays in lockstep with the transcript tail: its newest entry
/// always mirrors the untagged text of the transcript's last line.
pub struct LineMerger {
    transcript: Vec<TranscriptLine>,
    recent: VecDeque<String>,
}

impl LineMerger {
    pub fn new() -> Self {
        Self {
            transcript: Vec::new(),
            recent: VecDeque::with_capacity(HISTORY_SIZE),
        }
    }

    /// Merge one filtered fragment into the transcript.
    ///
    /// Decision order, cheapest and most conclusive first:
    /// 1. exact duplicate of any window entry -> drop;
    /// 2. strict subset of any window entry -> drop;
    /// 3. against the newest window entry: prefix growth -> replace,
    ///    fuzzy correction -> replace, stale shorter re-render -> drop;
    /// 4. otherwise append a new line.
    pub fn merge(&mut self, speaker: &str, text: &str) -> MergeAction {
        if self.recent.iter().any(|line| line == text) {
            debug!("Dropped exact duplicate: '{}'", text);
            return MergeAction::Dropped;
        }

        if self.recent.iter().any(|line| line.contains(text)) {
            debug!("Dropped subset fragment: '{}'", text);
            return MergeAction::Dropped;
        }

        if let Some(last) = self.recent.back() {
            let last_lower = last.to_lowercase();
            let text_lower = text.to_lowercase();

            if text_lower.starts_with(&last_lower) {
                // Incremental rendering: the caption grew in place.
                debug!("Grew last line: '{}' -> '{}'", last, text);
                return self.replace_last(text);
            }

            if is_similar(last, text) {
                // Mid-stream correction (e.g. a homophone fix).
                debug!("Corrected last line: '{}' -> '{}'", last, text);
                return self.replace_last(text);
            }

            if last_lower.starts_with(&text_lower) {
                debug!("Dropped jitter re-render: '{}'", text);
                return MergeAction::Dropped;
            }
        }

        self.transcript.push(TranscriptLine {
            speaker: speaker.to_string(),
            text: text.to_string(),
        });
        self.recent.push_back(text.to_string());
        if self.recent.len() > HISTORY_SIZE {
            self.recent.pop_front();
        }

        let index = self.transcript.len() - 1;
        debug!("Appended line {}: '{}'", index, text);
        MergeAction::Appended(index)
    }

    fn replace_last(&mut self, text: &str) -> MergeAction {
        let index = self.transcript.len() - 1;
        self.transcript[index].text = text.to_string();
        if let Some(last) = self.recent.back_mut() {
            *last = text.to_string();
        }
        MergeAction::Replaced(index)
    }

    pub fn transcript(&self) -> &[TranscriptLine] {
        &self.transcript
    }

    /// Render the transcript as one newline-delimited string.
    pub fn join(&self) -> String {
        self.transcript
            .iter()
            .map(TranscriptLine::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[cfg(test)]
    fn window(&self) -> &VecDeque<String> {
        &self.recent
    }
}

impl Default for LineMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Character-level similarity check used for mid-stream corrections.
///
/// Bails out before computing the edit distance when either side is longer
/// than [`MAX_SIMILARITY_CHARS`] or the lengths differ by more than half of
/// the shorter one.
pub fn is_similar(a: &str, b: &str) -> bool {
    let len_a = a.chars().count();
    let len_b = b.chars().count();

    if len_a > MAX_SIMILARITY_CHARS || len_b > MAX_SIMILARITY_CHARS {
        return false;
    }

    let (shorter, longer) = if len_a < len_b {
        (len_a, len_b)
    } else {
        (len_b, len_a)
    };
    if longer - shorter > shorter / 2 {
        return false;
    }

    let distance = levenshtein(a, b);
    (distance as f64) < SIMILARITY_THRESHOLD * longer as f64
}
