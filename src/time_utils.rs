// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Day-level key (`YYYY-MM-DD`) for an exercise date.
pub fn day_key(date: DateTime<Utc>) -> String {
    date.date_naive().format("%Y-%m-%d").to_string()
}

/// Parse a day key back into a date, rejecting anything that is not
/// `YYYY-MM-DD`.
pub fn parse_day_key(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_drops_time_component() {
        let date = DateTime::from_timestamp(1_704_103_200, 0).unwrap();
        assert_eq!(day_key(date), "2024-01-01");
    }

    #[test]
    fn test_parse_day_key_rejects_timestamps() {
        assert!(parse_day_key("2024-01-01").is_some());
        assert!(parse_day_key("2024-01-01T10:00:00Z").is_none());
        assert!(parse_day_key("yesterday").is_none());
    }
}
