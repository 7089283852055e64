//! Time utility functions
//!
//! Timestamps travel through the pipeline as timezone-less `NaiveDateTime`
//! (spreadsheet cells and PostgreSQL `TIMESTAMP` carry no zone). They are
//! interpreted as UTC when handed to the ClickHouse client, which works with
//! `time::OffsetDateTime`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Datetime layouts accepted from text cells, tried in order
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Date-only layouts accepted from text cells (midnight is assumed)
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];

/// Parse a timestamp typed as text in a spreadsheet cell
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    // RFC 3339 with an explicit offset, normalized to UTC
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Convert a naive (UTC) chrono datetime to time OffsetDateTime
pub fn naive_to_offset(dt: NaiveDateTime) -> time::OffsetDateTime {
    time::OffsetDateTime::from_unix_timestamp(dt.and_utc().timestamp()).unwrap_or_else(|_| {
        tracing::warn!(%dt, "Timestamp out of range, using epoch");
        time::OffsetDateTime::UNIX_EPOCH
    })
}

/// Convert time OffsetDateTime back to a naive (UTC) chrono datetime
pub fn offset_to_naive(dt: time::OffsetDateTime) -> NaiveDateTime {
    DateTime::from_timestamp(dt.unix_timestamp(), 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_iso() {
        assert_eq!(
            parse_timestamp("2024-03-05 14:30:00"),
            Some(ymd_hms(2024, 3, 5, 14, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2024-03-05T14:30:00"),
            Some(ymd_hms(2024, 3, 5, 14, 30, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_fractional_seconds() {
        let dt = parse_timestamp("2024-03-05 14:30:00.250").unwrap();
        assert_eq!(dt.second(), 0);
        assert_eq!(dt.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_timestamp_date_only() {
        assert_eq!(
            parse_timestamp("2024-03-05"),
            Some(ymd_hms(2024, 3, 5, 0, 0, 0))
        );
        assert_eq!(
            parse_timestamp("05.03.2024"),
            Some(ymd_hms(2024, 3, 5, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_dotted_with_time() {
        assert_eq!(
            parse_timestamp("05.03.2024 09:15"),
            Some(ymd_hms(2024, 3, 5, 9, 15, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_rfc3339_offset() {
        let dt = parse_timestamp("2024-01-15T10:30:00+05:00").unwrap();
        assert_eq!(dt.hour(), 5);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("2024-13-40"), None);
    }

    #[test]
    fn test_naive_offset_conversion() {
        let dt = ymd_hms(2024, 1, 1, 0, 0, 0);
        let offset = naive_to_offset(dt);
        assert_eq!(offset.unix_timestamp(), 1_704_067_200);
        let back = offset_to_naive(offset);
        assert_eq!(back, dt);
        assert_eq!(back.year(), 2024);
    }
}
