//! Server datetime conventions.
//!
//! The ORM stores datetimes as naive UTC strings and compares date
//! filters against them, so day filters need explicit datetime bounds.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::ClientError;

/// Wire datetime format (UTC, no timezone suffix).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, ClientError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| ClientError::Decode(format!("invalid datetime {s:?}: {e}")))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ClientError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| ClientError::Decode(format!("invalid date {s:?}: {e}")))
}

/// Current time formatted for the wire.
pub fn now_string() -> String {
    format_datetime(Utc::now())
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Inclusive datetime bounds covering one calendar day, for range filters.
pub fn day_bounds(date: NaiveDate) -> (String, String) {
    (format!("{date} 00:00:00"), format!("{date} 23:59:59"))
}

pub fn today_bounds() -> (String, String) {
    day_bounds(today())
}

/// Compact timestamp safe for filenames, e.g. `20250309143005`.
pub fn file_stamp() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_round_trips() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 9, 14, 30, 5).unwrap();
        let s = format_datetime(dt);
        assert_eq!(s, "2025-03-09 14:30:05");
        assert_eq!(parse_datetime(&s).unwrap(), dt);
    }

    #[test]
    fn parse_rejects_iso_8601() {
        assert!(parse_datetime("2025-03-09T14:30:05Z").is_err());
    }

    #[test]
    fn day_bounds_span_whole_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let (start, end) = day_bounds(date);
        assert_eq!(start, "2025-03-09 00:00:00");
        assert_eq!(end, "2025-03-09 23:59:59");
    }
}
