//! Shared formatting utilities used by both CLI and TUI
//!
//! Single source of truth for string truncation, number and percentage
//! rendering, queue bars and timestamps.

use chrono::{DateTime, Local};

/// Layout constants used across CLI and TUI
pub mod layout {
    pub const BAR_LENGTH: usize = 20;
}

/// Truncate a string to a maximum length (in characters), adding "..." at the end if truncated.
///
/// This function is Unicode-safe and counts characters, not bytes.
///
/// # Examples
/// ```
/// use qdash::formatting::truncate_string;
/// assert_eq!(truncate_string("hello", 10), "hello");
/// assert_eq!(truncate_string("hello world", 8), "hello...");
/// assert_eq!(truncate_string("ab", 2), "ab");
/// ```
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        // Edge case: if max_len is very small, just truncate without ellipsis
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a number with at most two decimals, dropping trailing zeros.
///
/// # Examples
/// ```
/// use qdash::formatting::format_number;
/// assert_eq!(format_number(45.0), "45");
/// assert_eq!(format_number(99.5), "99.5");
/// assert_eq!(format_number(0.126), "0.13");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Format a percentage value (already scaled to 0-100).
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value))
}

/// Format a duration given in seconds, e.g. an average job time.
#[must_use]
pub fn format_seconds(value: f64) -> String {
    format!("{}s", format_number(value))
}

/// Render a queue depth as an ASCII bar scaled against `max`.
///
/// # Examples
/// ```
/// use qdash::formatting::queue_bar;
/// assert_eq!(queue_bar(5, 10, 10), "[=====.....]");
/// assert_eq!(queue_bar(0, 0, 4), "[....]");
/// ```
#[must_use]
pub fn queue_bar(queue: u32, max: u32, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((queue as f64 / max as f64) * width as f64).round() as usize
    };
    let filled = filled.min(width);
    format!("[{}{}]", "=".repeat(filled), ".".repeat(width - filled))
}

/// Format a "last updated" instant as local wall-clock time.
#[must_use]
pub fn format_clock(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}
