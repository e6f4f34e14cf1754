use crate::date_index::Resolution;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Observations for one site: timestamp -> variable -> value.
///
/// A frame only holds values that were actually observed; gaps are
/// represented by absent entries, never by sentinel numbers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SiteFrame {
    pub site_id: String,
    rows: BTreeMap<NaiveDateTime, BTreeMap<String, f64>>,
}

impl SiteFrame {
    pub fn new(site_id: &str) -> Self {
        SiteFrame {
            site_id: site_id.to_string(),
            rows: BTreeMap::new(),
        }
    }

    /// Record one value. Non-finite values are dropped.
    pub fn insert(&mut self, datetime: NaiveDateTime, variable: &str, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.rows
            .entry(datetime)
            .or_default()
            .insert(variable.to_string(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct timestamps.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn value(&self, datetime: &NaiveDateTime, variable: &str) -> Option<f64> {
        self.rows.get(datetime).and_then(|r| r.get(variable)).copied()
    }

    /// All observed `(timestamp, value)` pairs of one variable, in time order.
    pub fn column(&self, variable: &str) -> Vec<(NaiveDateTime, f64)> {
        self.rows
            .iter()
            .filter_map(|(dt, r)| r.get(variable).map(|v| (*dt, *v)))
            .collect()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.rows.keys()
    }
}

/// A Data Screener: returns the observations of one site for a date range.
///
/// Implementations must degrade to an empty frame when the source has no
/// data or cannot be reached; callers treat an empty frame as "no trace".
pub trait ObservationSource {
    fn screen(
        &self,
        site_id: &str,
        variables: &[&str],
        start_date: NaiveDate,
        end_date: NaiveDate,
        resolution: Resolution,
    ) -> SiteFrame;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 12, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_and_read_back() {
        let mut frame = SiteFrame::new("SASP");
        frame.insert(dt(3, 0), "UpAir_Avg_C", -4.5);
        frame.insert(dt(3, 0), "PyUp_Unfilt_W", 120.0);
        frame.insert(dt(4, 0), "UpAir_Avg_C", -6.0);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.value(&dt(3, 0), "UpAir_Avg_C"), Some(-4.5));
        assert_eq!(frame.value(&dt(4, 0), "PyUp_Unfilt_W"), None);
        assert_eq!(
            frame.column("UpAir_Avg_C"),
            vec![(dt(3, 0), -4.5), (dt(4, 0), -6.0)]
        );
        assert_eq!(frame.column("PyUp_Unfilt_W"), vec![(dt(3, 0), 120.0)]);
        assert!(frame.column("PyDwn_Unfilt_W").is_empty());
    }

    #[test]
    fn test_non_finite_values_are_dropped() {
        let mut frame = SiteFrame::new("SASP");
        frame.insert(dt(3, 0), "UpAir_Avg_C", f64::NAN);
        frame.insert(dt(3, 1), "UpAir_Avg_C", f64::INFINITY);
        assert!(frame.is_empty());
    }
}
