//! Small helpers shared by the agents and the HTTP layer

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

/// Timestamp layout used in conversation records and API responses
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static AGENT_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("static agent name pattern"));

/// Format a timestamp the way conversation records store it
pub fn format_timestamp(dt: &DateTime<Local>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time, formatted
pub fn now_timestamp() -> String {
    format_timestamp(&Local::now())
}

/// Agent names start with a letter followed by letters, digits or underscores
pub fn validate_agent_name(name: &str) -> bool {
    AGENT_NAME_RE.is_match(name)
}

/// Keep only `[a-zA-Z0-9_-]`; an id that ends up empty becomes `"default"`
pub fn sanitize_conversation_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

/// Shorten text for log previews, appending `...` when cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
