//! Shared utility functions for SHREAD crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    /// Timestamp format used in the cache tables: "YYYY-MM-DD HH:MM:SS"
    pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Format a NaiveDateTime as "YYYY-MM-DD HH:MM:SS"
    pub fn format_datetime(datetime: &NaiveDateTime) -> String {
        datetime.format(DATETIME_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Parse a date string in "YYYYMMDD" format
    pub fn parse_date_compact(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y%m%d")?)
    }

    /// Parse a timestamp as written by the CSAS and AWDB exports.
    ///
    /// Accepts "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DD HH:MM", "YYYY-MM-DDTHH:MM:SS"
    /// and bare dates (which map to midnight).
    pub fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
        let s = s.trim();
        for fmt in [DATETIME_FORMAT, "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(dt);
            }
        }
        let date = if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
            parse_date_compact(s)?
        } else {
            parse_date(s)?
        };
        Ok(date.and_time(NaiveTime::MIN))
    }

    /// Midnight at the start of `date`.
    pub fn start_of_day(date: &NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN)
    }

}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
