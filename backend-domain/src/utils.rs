use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::TimestampParseError;

/// Accepted naive layouts after the RFC 3339 attempt fails. `%.f` matches
/// both "no fractional part" and ".123456".
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 date-time into a UTC instant. Offset-aware values are
/// converted; naive values are taken as already UTC so every timestamp in a
/// stream ends up on one timeline.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(TimestampParseError {
        raw: raw.to_string(),
    })
}
