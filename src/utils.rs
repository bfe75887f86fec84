// Utility functions
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serializer;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a timestamp, keeping the offset it carries.
///
/// Accepts RFC 3339, naive ISO-8601 date-times (read as UTC) and bare dates
/// (midnight UTC).
pub fn parse_datetime(date_str: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = date_str.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn serialize_rounded_2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 2))
}

/// Turns an arbitrary id (e.g. an e-mail) into a file-name-safe stem.
pub fn to_file_stem(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc};

    #[test]
    fn parses_rfc3339_and_keeps_offset() {
        let dt = parse_datetime("2024-03-01T23:30:00+02:00").unwrap();
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(dt.with_timezone(&Utc).hour(), 21);
    }

    #[test]
    fn parses_naive_and_date_only() {
        assert!(parse_datetime("2024-03-01T08:00:00").is_some());
        assert!(parse_datetime("2024-03-01 08:00:00.250").is_some());
        let midnight = parse_datetime("2024-03-01").unwrap();
        assert_eq!(midnight.hour(), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn rounds_to_requested_decimals() {
        assert_eq!(round_to(12.346, 2), 12.35);
        assert_eq!(round_to(0.666, 1), 0.7);
    }

    #[test]
    fn file_stem_is_safe() {
        assert_eq!(to_file_stem("Jane.Doe@Example.com"), "jane-doe-example-com");
    }
}
