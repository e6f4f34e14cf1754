use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use shread_utils::{dates::start_of_day, error::DateError};

/// Data resolution of a request: daily values (`dv`) or instantaneous,
/// hourly values (`iv`).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "dv")]
    Daily,
    #[serde(rename = "iv")]
    Instantaneous,
}

impl Resolution {
    /// Parse the dashboard's `dv` / `iv` code.
    pub fn from_code(code: &str) -> Option<Resolution> {
        match code.trim().to_lowercase().as_str() {
            "dv" => Some(Resolution::Daily),
            "iv" => Some(Resolution::Instantaneous),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Resolution::Daily => "dv",
            Resolution::Instantaneous => "iv",
        }
    }

    /// Spacing between consecutive timestamps.
    pub fn step(&self) -> TimeDelta {
        match self {
            Resolution::Daily => TimeDelta::days(1),
            Resolution::Instantaneous => TimeDelta::hours(1),
        }
    }
}

/// A timestamp iterator that yields each step from the start
/// through the end (inclusive). It stops early rather than stepping past
/// the last representable timestamp.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange {
    next: Option<NaiveDateTime>,
    end: NaiveDateTime,
    step: TimeDelta,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: TimeDelta) -> Self {
        DateRange {
            next: Some(start),
            end,
            step,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDateTime;
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|n| *n <= self.end)?;
        self.next = current.checked_add_signed(self.step);
        Some(current)
    }
}

/// The shared x-axis of one figure.
///
/// Built from `(start_date, end_date, resolution)`; every series in a
/// figure is aligned to the same index. Timestamps are UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct DateIndex {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub resolution: Resolution,
    stamps: Vec<NaiveDateTime>,
}

impl DateIndex {
    /// Build the index. Both ends are inclusive; the sub-daily index ends
    /// at midnight of `end_date`.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        resolution: Resolution,
    ) -> Result<DateIndex, DateError> {
        if start_date > end_date {
            return Err(DateError(format!(
                "start date {} is after end date {}",
                start_date, end_date
            )));
        }
        let stamps = DateRange::new(
            start_of_day(&start_date),
            start_of_day(&end_date),
            resolution.step(),
        )
        .collect();
        Ok(DateIndex {
            start_date,
            end_date,
            resolution,
            stamps,
        })
    }

    /// Convenience for the daily index over the same window.
    pub fn daily(&self) -> DateIndex {
        match self.resolution {
            Resolution::Daily => self.clone(),
            Resolution::Instantaneous => {
                // start <= end was checked when self was built
                let stamps = DateRange::new(
                    start_of_day(&self.start_date),
                    start_of_day(&self.end_date),
                    Resolution::Daily.step(),
                )
                .collect();
                DateIndex {
                    start_date: self.start_date,
                    end_date: self.end_date,
                    resolution: Resolution::Daily,
                    stamps,
                }
            }
        }
    }

    pub fn stamps(&self) -> &[NaiveDateTime] {
        &self.stamps
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDateTime> {
        self.stamps.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDateTime> {
        self.stamps.last().copied()
    }

    /// Position of `stamp` in the index, if present.
    pub fn position(&self, stamp: &NaiveDateTime) -> Option<usize> {
        self.stamps.binary_search(stamp).ok()
    }

    /// First timestamp at or after `stamp`.
    pub fn first_at_or_after(&self, stamp: &NaiveDateTime) -> Option<NaiveDateTime> {
        let i = self.stamps.partition_point(|s| s < stamp);
        self.stamps.get(i).copied()
    }
}
