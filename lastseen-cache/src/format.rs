//! Display helpers for access timestamps.
//!
//! Pure functions with no shared state. They never fail: an unreadable
//! timestamp renders as a fixed sentinel and is logged.

use chrono::Utc;
use lastseen_core::{parse_timestamp, Timestamp};

/// Rendered by [`format_absolute`] for an unreadable timestamp.
pub const INVALID_DATE: &str = "Invalid date";

/// Rendered by [`format_relative`] for an unreadable timestamp.
pub const UNKNOWN_TIME: &str = "Unknown";

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
/// Beyond this, relative phrasing gives way to the calendar date.
const RELATIVE_HORIZON: i64 = 30 * DAY;

const DATE_TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";
const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Render a timestamp as `M/D/YYYY, h:mm:ss AM` in UTC.
pub fn format_absolute(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => ts.format(DATE_TIME_FORMAT).to_string(),
        None => {
            tracing::warn!(timestamp = raw, "Cannot format unparseable timestamp");
            INVALID_DATE.to_string()
        }
    }
}

/// Render the time since `raw` coarsely, e.g. "3 hours ago".
pub fn format_relative(raw: &str) -> String {
    format_relative_at(raw, Utc::now())
}

/// [`format_relative`] against an explicit "now".
///
/// Buckets, each inclusive of its lower bound:
/// under a minute is "just now", then minutes, hours, and days up to 30
/// days, after which the calendar date is shown. Timestamps in the future
/// read as "just now".
pub fn format_relative_at(raw: &str, now: Timestamp) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        tracing::warn!(timestamp = raw, "Cannot format unparseable timestamp");
        return UNKNOWN_TIME.to_string();
    };

    let elapsed = (now - ts).num_seconds();
    match elapsed {
        s if s < MINUTE => "just now".to_string(),
        s if s < HOUR => ago(s / MINUTE, "minute"),
        s if s < DAY => ago(s / HOUR, "hour"),
        s if s < RELATIVE_HORIZON => ago(s / DAY, "day"),
        _ => ts.format(DATE_FORMAT).to_string(),
    }
}

fn ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
