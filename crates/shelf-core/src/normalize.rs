//! Status and tag normalization for free-text input.

use lazy_static::lazy_static;
use shelf_domain::{clean_tags, ReadingStatus};
use std::collections::HashMap;

lazy_static! {
    /// Lowercased synonym → canonical status. Canonical labels are matched
    /// before this table is consulted.
    static ref STATUS_SYNONYMS: HashMap<&'static str, ReadingStatus> = {
        use ReadingStatus::*;
        HashMap::from([
            ("to read", ToRead),
            ("to_read", ToRead),
            ("toread", ToRead),
            ("want to read", ToRead),
            ("want-to-read", ToRead),
            ("tbr", ToRead),
            ("unread", ToRead),
            ("planned", ToRead),
            ("currently reading", Reading),
            ("currently-reading", Reading),
            ("in progress", Reading),
            ("in-progress", Reading),
            ("started", Reading),
            ("done", Finished),
            ("completed", Finished),
            ("complete", Finished),
            ("read", Finished),
            ("finished reading", Finished),
            ("on hold", OnHold),
            ("on_hold", OnHold),
            ("onhold", OnHold),
            ("paused", OnHold),
            ("dnf", Abandoned),
            ("did not finish", Abandoned),
            ("dropped", Abandoned),
            ("gave up", Abandoned),
        ])
    };
}

/// Map a free-text status to the closed enumeration.
///
/// Case-insensitive and whitespace-tolerant; `None` for anything unknown.
pub fn normalize_status(token: &str) -> Option<ReadingStatus> {
    let normalized = token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    ReadingStatus::from_label(&normalized).or_else(|| STATUS_SYNONYMS.get(normalized.as_str()).copied())
}

/// Like [`normalize_status`] but unknown input falls back to `to-read`
pub fn status_or_default(token: &str) -> ReadingStatus {
    normalize_status(token).unwrap_or_default()
}

/// Split `;`-separated tags, trimming each and dropping empties
pub fn parse_tags(text: &str) -> Vec<String> {
    clean_tags(text.split(';'))
}

/// Join tags for a single CSV cell
pub fn format_tags(tags: &[String]) -> String {
    tags.join(";")
}
