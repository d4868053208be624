use std::time::SystemTime;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Format used for the `timestamp` field of manifest file records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a modification time as an ISO-8601 date and time with second
/// precision, in UTC.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(TIMESTAMP_FORMAT).to_string()
}

/// ISO year and week of `date`, rendered as `year-week` by callers.
pub fn iso_year_week(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn test_format_timestamp() {
        let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000) + Duration::from_millis(750);
        assert_eq!(format_timestamp(time), "2023-11-14 22:13:20");
    }

    #[test]
    fn test_iso_year_week_crosses_year() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(iso_year_week(date), (2020, 53));

        let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(iso_year_week(date), (2025, 1));
    }
}
