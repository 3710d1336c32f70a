//! Defensive timestamp parsing for loosely-typed source fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp from a JSON value.
///
/// Numbers are unix seconds; strings go through [`parse_timestamp`]. Anything else
/// (null, bool, containers) yields `None`.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => number.as_f64().and_then(from_unix_seconds),
        Value::String(text) => parse_timestamp(text),
        _ => None,
    }
}

/// Parse a timestamp string.
///
/// Accepts RFC 3339 (`2025-01-04T10:00:00Z`, `...+02:00`), naive ISO datetimes
/// (read as UTC), RFC 2822 (`Sat, 04 Jan 2025 10:00:00 GMT`), plain `YYYY-MM-DD`
/// dates (midnight UTC), and unix seconds written as digits. Returns `None` when
/// nothing matches.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    if raw.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return raw.parse::<f64>().ok().and_then(from_unix_seconds);
    }
    None
}

fn from_unix_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    Utc.timestamp_opt(whole as i64, nanos).single()
}

/// Whole days elapsed from `then` to `now`, truncated toward zero.
///
/// Negative when `then` lies in the future.
pub fn age_in_days(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_zulu_and_offsets() {
        assert_eq!(
            parse_timestamp("2025-01-04T10:00:00Z"),
            Some(at(2025, 1, 4, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2025-01-04T12:00:00+02:00"),
            Some(at(2025, 1, 4, 10, 0, 0))
        );
    }

    #[test]
    fn parses_naive_iso_as_utc() {
        let fractional = parse_timestamp("2025-01-04T10:00:00.123456");
        assert_eq!(
            fractional.map(|t| t.timestamp()),
            Some(at(2025, 1, 4, 10, 0, 0).timestamp())
        );
        assert_eq!(
            parse_timestamp("2025-01-04 10:00:00"),
            Some(at(2025, 1, 4, 10, 0, 0))
        );
    }

    #[test]
    fn parses_feed_dates_and_plain_dates() {
        assert_eq!(
            parse_timestamp("Sat, 04 Jan 2025 10:00:00 +0000"),
            Some(at(2025, 1, 4, 10, 0, 0))
        );
        assert_eq!(parse_timestamp("2025-01-04"), Some(at(2025, 1, 4, 0, 0, 0)));
    }

    #[test]
    fn parses_unix_seconds() {
        assert_eq!(
            parse_timestamp_value(&json!(1_736_000_000)),
            Some(Utc.timestamp_opt(1_736_000_000, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("1736000000"),
            Some(Utc.timestamp_opt(1_736_000_000, 0).unwrap())
        );
    }

    #[test]
    fn rejects_garbage_and_empty_values() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday-ish"), None);
        assert_eq!(parse_timestamp("2025-13-40"), None);
        assert_eq!(parse_timestamp_value(&json!(null)), None);
        assert_eq!(parse_timestamp_value(&json!(true)), None);
    }

    #[test]
    fn age_in_days_truncates() {
        let now = at(2025, 1, 10, 12, 0, 0);
        assert_eq!(age_in_days(at(2025, 1, 3, 13, 0, 0), now), 6);
        assert_eq!(age_in_days(at(2025, 1, 3, 12, 0, 0), now), 7);
        assert_eq!(age_in_days(at(2025, 1, 11, 12, 0, 0), now), -1);
    }
}
