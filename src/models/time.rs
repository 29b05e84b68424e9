//! Server timestamp helpers

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parse a server timestamp
///
/// Accepts RFC 3339 and the zone-less `2024-09-01 10:00:00` style the API
/// uses, which is read as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Get relative time string (e.g., "5m", "2h", "3d")
///
/// Falls back to the raw text when it cannot be parsed.
pub fn relative_time(raw: &str, now: DateTime<Utc>) -> String {
    let Some(at) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let duration = now.signed_duration_since(at);

    if duration.num_seconds() < 60 {
        format!("{}s", duration.num_seconds().max(0))
    } else if duration.num_minutes() < 60 {
        format!("{}m", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d", duration.num_days())
    } else {
        at.format("%b %d").to_string()
    }
}
