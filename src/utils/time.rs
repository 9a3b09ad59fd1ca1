use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;

/// Seconds in a minute
pub const MINUTE: u64 = 60;
/// Seconds in an hour
pub const HOUR: u64 = 60 * MINUTE;
/// Seconds in a day
pub const DAY: u64 = 24 * HOUR;
/// Seconds in a week
pub const WEEK: u64 = 7 * DAY;

/// Returns the current wall-clock time in seconds since the Unix epoch.
///
/// Only tooling uses this. Governance logic is driven by block time.
pub fn current_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Format a duration given in seconds, e.g. `7d 0h 0m`
pub fn format_duration(seconds: u64) -> String {
    if seconds < MINUTE {
        return format!("{}s", seconds);
    }

    let days = seconds / DAY;
    let hours = (seconds % DAY) / HOUR;
    let minutes = (seconds % HOUR) / MINUTE;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, seconds % MINUTE)
    }
}

/// Render a block timestamp as RFC 3339, falling back to the raw number
pub fn format_block_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(2 * HOUR + 5 * MINUTE), "2h 5m");
        assert_eq!(format_duration(WEEK), "7d 0h 0m");
    }

    #[test]
    fn test_format_block_time() {
        assert_eq!(format_block_time(0), "1970-01-01T00:00:00+00:00");
        assert_eq!(format_block_time(u64::MAX), u64::MAX.to_string());
    }
}
