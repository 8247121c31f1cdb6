//! Noise filter for raw caption fragments
//!
//! Pure text-based filtering: non-content tag kinds, too-short fragments
//! and known UI-chrome phrases of the host application are rejected before
//! anything reaches the merger.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Minimum trimmed fragment length worth keeping.
pub const MIN_FRAGMENT_CHARS: usize = 5;

/// Tag kinds that never carry caption content.
static IGNORED_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "SCRIPT", "STYLE", "NOSCRIPT", "SVG", "PATH", "IMG", "VIDEO", "AUDIO",
        "IFRAME", "LINK", "META", "BUTTON", "INPUT", "SELECT", "TEXTAREA",
    ])
});

/// Literal UI-chrome phrases of the host application (button and menu
/// labels), in every language the host renders them in.
static NOISE_PHRASES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "You",
        "Meeting details",
        "People",
        "Chat",
        "Activities",
        "Turn on captions",
        "Turn off captions",
        "Present now",
        "More options",
        "Leave call",
        "Mute",
        "Unmute",
        "Camera",
        "Microphone",
        "Raise hand",
        "Stop recording",
        "Вы",
        "Детали встречи",
        "Люди",
        "Чат",
        "Действия",
        "Включить субтитры",
    ])
});

/// Decide whether a raw fragment is worth forwarding to the merger.
///
/// Deterministic and side-effect free. Cheapest checks first: tag kind,
/// then trimmed length, then the phrase set.
pub fn should_keep(text: &str, tag: &str) -> bool {
    if IGNORED_TAGS.contains(tag.to_ascii_uppercase().as_str()) {
        return false;
    }

    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_FRAGMENT_CHARS {
        return false;
    }

    !NOISE_PHRASES.contains(trimmed)
}
