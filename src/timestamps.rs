/// Timestamp parsing and formatting.
///
/// Raw timestamps arrive as ISO-8601 strings (usually the `datetime` attribute
/// of a post's `<time>` element). Everything is normalized to UTC before any
/// hour or weekday is extracted.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Naive layouts accepted when the string carries no offset. Interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 timestamp into a UTC instant.
///
/// A trailing `Z` (or `z`) is rewritten to `+00:00` first, so
/// `2024-01-01T09:00:00Z` and `2024-01-01T09:00:00+00:00` land on the same
/// instant. Returns `None` for anything that does not parse.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = match trimmed.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    // RFC 3339 requires the 'T'; also accept a space separator with an offset
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format an instant as UTC string.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format an optional instant, using '-' when missing.
pub fn format_timestamp_opt(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(format_timestamp).unwrap_or_else(|| "-".to_string())
}
