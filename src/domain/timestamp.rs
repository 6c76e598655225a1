//! Lenient ISO-8601 timestamp parsing.
//!
//! Status documents come from several runtimes, and not all of them emit
//! strict RFC 3339. A trailing `Z` and hour-only offsets (`+00`, `-05`) are
//! first rewritten to `+HH:00`. Accepted forms, tried in order:
//! - RFC 3339 (`2021-01-01T00:00:00Z`, `2021-01-01T02:00:00.1234567+02:00`)
//! - compact offsets (`2021-01-01T00:00:00+0000`)
//! - minute precision with an offset (`2021-01-01T00:00Z`)
//! - naive date-times, `T` or space separated, with or without seconds, read as UTC
//! - bare dates, read as midnight UTC

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::StatusError;

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Shortest input that can carry an hour-only offset: `YYYY-MM-DDTHH+HH`
const MIN_HOUR_OFFSET_LEN: usize = 16;

/// Rewrite `Z` and `±HH` suffixes to `±HH:00`
fn normalise_offset(trimmed: &str) -> Cow<'_, str> {
    if let Some(rest) = trimmed.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        return Cow::Owned(format!("{}+00:00", rest));
    }

    let bytes = trimmed.as_bytes();
    if bytes.len() >= MIN_HOUR_OFFSET_LEN {
        let sign = bytes[bytes.len() - 3];
        let hours = &bytes[bytes.len() - 2..];
        if (sign == b'+' || sign == b'-') && hours.iter().all(u8::is_ascii_digit) {
            return Cow::Owned(format!("{}:00", trimmed));
        }
    }

    Cow::Borrowed(trimmed)
}

/// Parse a timestamp field, normalising to UTC
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, StatusError> {
    let trimmed = raw.trim();
    let with_offset = normalise_offset(trimmed);

    if let Ok(dt) = DateTime::parse_from_rfc3339(&with_offset) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(StatusError::MalformedTimestamp {
        field,
        value: raw.to_string(),
    })
}
