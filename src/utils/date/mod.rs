// Date utility functions
// Shared by the persisted document, the countdown ticker and drop import

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Fixed pattern used for `end_date` strings in the config file.
pub const END_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-only pattern accepted on load and in the settings dialog.
pub const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndDateError {
    #[error("no end date set")]
    Missing,
    #[error("invalid end date '{0}', expected YYYY-MM-DD HH:MM:SS")]
    Malformed(String),
}

/// Parse a stored end date. Accepts the full `YYYY-MM-DD HH:MM:SS` form and
/// a bare `YYYY-MM-DD` (interpreted as midnight).
pub fn parse_end_date(value: &str) -> Result<NaiveDateTime, EndDateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EndDateError::Missing);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, END_DATE_FORMAT) {
        return Ok(dt);
    }

    NaiveDate::parse_from_str(trimmed, DATE_ONLY_FORMAT)
        .map(midnight)
        .map_err(|_| EndDateError::Malformed(trimmed.to_string()))
}

/// Format a date as the stored end-date string (always midnight).
pub fn format_end_date(date: NaiveDate) -> String {
    midnight(date).format(END_DATE_FORMAT).to_string()
}

pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn tomorrow(today: NaiveDate) -> NaiveDate {
    today + Duration::days(1)
}

/// Whole calendar days from `today` until `end`. Negative once `end` has passed.
pub fn days_remaining(end: NaiveDate, today: NaiveDate) -> i64 {
    (end - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_full_format() {
        let parsed = parse_end_date("2026-12-24 00:00:00").unwrap();
        assert_eq!(parsed, midnight(date(2026, 12, 24)));
    }

    #[test]
    fn parses_date_only_as_midnight() {
        let parsed = parse_end_date(" 2026-03-01 ").unwrap();
        assert_eq!(parsed, midnight(date(2026, 3, 1)));
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "whitespace")]
    fn blank_is_missing(value: &str) {
        assert_eq!(parse_end_date(value), Err(EndDateError::Missing));
    }

    #[test_case("2026-13-01 00:00:00"; "bad month")]
    #[test_case("next tuesday"; "prose")]
    #[test_case("2026/01/01"; "slashes")]
    fn rejects_malformed(value: &str) {
        assert!(matches!(parse_end_date(value), Err(EndDateError::Malformed(_))));
    }

    #[test]
    fn formats_with_midnight_time() {
        assert_eq!(format_end_date(date(2026, 10, 20)), "2026-10-20 00:00:00");
    }

    #[test]
    fn days_remaining_crosses_month_boundary() {
        assert_eq!(days_remaining(date(2026, 11, 2), date(2026, 10, 30)), 3);
        assert_eq!(days_remaining(date(2026, 10, 30), date(2026, 10, 30)), 0);
        assert_eq!(days_remaining(date(2026, 10, 29), date(2026, 10, 30)), -1);
    }

    #[test]
    fn tomorrow_handles_year_end() {
        assert_eq!(tomorrow(date(2026, 12, 31)), date(2027, 1, 1));
    }
}
