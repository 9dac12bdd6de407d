use chrono::{DateTime, Local};

const SECS_PER_HOUR: i64 = 3600;
const SECS_PER_MINUTE: i64 = 60;

/// Human readable duration, e.g. "1 hour 1 minute 1 second".
///
/// Hours do not roll over into days. Zero-valued hour and minute parts are
/// omitted, seconds are shown whenever they are non-zero or nothing else is.
/// Negative input reads as "0 seconds".
pub fn format_duration(total_secs: i64) -> String {
    if total_secs < 0 {
        return "0 seconds".to_string();
    }

    let hours = total_secs / SECS_PER_HOUR;
    let minutes = (total_secs % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let seconds = total_secs % SECS_PER_MINUTE;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if seconds > 0 || (hours == 0 && minutes == 0) {
        parts.push(plural(seconds, "second"));
    }

    parts.join(" ")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Locale-style timestamp used in persisted records: `3/1/2024, 9:05:00 AM`
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
