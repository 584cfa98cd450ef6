//! Display helpers for durations and remote timestamps

use chrono::{Local, TimeZone};
use std::time::Duration;

/// Rendering used for values that cannot be interpreted
pub const UNKNOWN: &str = "Unknown";

/// Formats a millisecond count as `1h 2m 3s`
///
/// The hour component is omitted when zero, and the minute component too
/// when both are zero: `0s`, `1m 1s`, `1h 1m 1s`.
pub fn format_duration_ms(ms: u64) -> String {
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Formats a millisecond epoch as local `YYYY-MM-DD HH:MM:SS`
///
/// Empty, non-numeric or out-of-range input yields [`UNKNOWN`].
pub fn format_timestamp(raw: &str) -> String {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Formats an elapsed wall time as `H:MM:SS`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}
