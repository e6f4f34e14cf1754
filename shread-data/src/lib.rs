//! Data shaping for the meteorology plot.
//!
//! This crate turns screened observations into series aligned on one
//! date index, reduces gridded values to basin averages, and derives the
//! axis ranges shared by every trace of a figure.

/// Alignment of observations onto a shared date index.
pub mod series {
    use chrono::{NaiveDateTime, Timelike};
    use shread_core::date_index::{DateIndex, Resolution};
    use shread_core::observation::SiteFrame;

    /// Floor a timestamp to the start of its day or hour.
    pub fn floor_to(resolution: Resolution, stamp: &NaiveDateTime) -> NaiveDateTime {
        match resolution {
            Resolution::Daily => stamp.date().and_hms_opt(0, 0, 0).unwrap_or(*stamp),
            Resolution::Instantaneous => stamp
                .date()
                .and_hms_opt(stamp.hour(), 0, 0)
                .unwrap_or(*stamp),
        }
    }

    /// Left-merge `(timestamp, value)` pairs onto the index.
    ///
    /// The result has exactly one slot per index timestamp; timestamps the
    /// index does not contain are dropped and uncovered slots are `None`.
    pub fn align(points: &[(NaiveDateTime, f64)], index: &DateIndex) -> Vec<Option<f64>> {
        let mut out = vec![None; index.len()];
        for (stamp, value) in points {
            if let Some(i) = index.position(stamp) {
                if value.is_finite() {
                    out[i] = Some(*value);
                }
            }
        }
        out
    }

    /// One variable of a site frame, aligned onto the index.
    pub fn frame_column(frame: &SiteFrame, variable: &str, index: &DateIndex) -> Vec<Option<f64>> {
        align(&frame.column(variable), index)
    }

    /// Apply `f` to every present value.
    pub fn map_values(values: &[Option<f64>], f: impl Fn(f64) -> f64) -> Vec<Option<f64>> {
        values.iter().map(|v| v.map(&f)).collect()
    }

    /// True when at least one slot holds a finite value.
    pub fn has_data(values: &[Option<f64>]) -> bool {
        values.iter().any(|v| matches!(v, Some(x) if x.is_finite()))
    }

    /// Maximum ignoring absent and NaN values.
    pub fn nan_max<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
        values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
    }

    /// Minimum ignoring absent and NaN values.
    pub fn nan_min<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<f64> {
        values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
    }

}

/// Basin-average reduction of screened grid values.
pub mod basin {
    use crate::series::{align, floor_to};
    use chrono::NaiveDateTime;
    use serde::Serialize;
    use shread_core::date_index::{DateIndex, Resolution};
    use shread_core::grid::GridDataset;
    use std::collections::BTreeMap;

    /// Per-timestamp spatial statistics over the screened cells.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct BasinAverage {
        pub stamps: Vec<NaiveDateTime>,
        pub mean: Vec<f64>,
        /// Present only when the median was requested.
        pub median: Option<Vec<f64>>,
    }

    impl BasinAverage {
        /// An empty result means "no data available"; callers skip the trace.
        pub fn is_empty(&self) -> bool {
            self.stamps.is_empty()
        }

        pub fn mean_on(&self, index: &DateIndex) -> Vec<Option<f64>> {
            align(&pairs(&self.stamps, &self.mean), index)
        }

        pub fn median_on(&self, index: &DateIndex) -> Option<Vec<Option<f64>>> {
            self.median
                .as_ref()
                .map(|m| align(&pairs(&self.stamps, m), index))
        }
    }

    fn pairs(stamps: &[NaiveDateTime], values: &[f64]) -> Vec<(NaiveDateTime, f64)> {
        stamps.iter().copied().zip(values.iter().copied()).collect()
    }

    /// Median of a non-empty slice; the mean of the middle pair for even counts.
    pub fn median(values: &mut [f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            Some((values[mid - 1] + values[mid]) / 2.0)
        } else {
            Some(values[mid])
        }
    }

    /// Reduce screened `(timestamp, value)` cells to one mean (and
    /// optionally one median) per timestamp. NaN cells are ignored.
    pub fn ba_stats(values: &[(NaiveDateTime, f64)], with_median: bool) -> BasinAverage {
        let mut grouped: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
        for (stamp, value) in values {
            if value.is_nan() {
                continue;
            }
            grouped.entry(*stamp).or_default().push(*value);
        }

        let mut stamps = Vec::with_capacity(grouped.len());
        let mut mean = Vec::with_capacity(grouped.len());
        let mut medians = Vec::with_capacity(grouped.len());
        for (stamp, mut cells) in grouped {
            let sum: f64 = cells.iter().sum();
            stamps.push(stamp);
            mean.push(sum / cells.len() as f64);
            if with_median {
                // cells is non-empty: every group got at least one push
                medians.push(median(&mut cells).unwrap_or(f64::NAN));
            }
        }
        log::debug!("[SHREAD] basin: reduced {} cells to {} steps", values.len(), stamps.len());
        BasinAverage {
            stamps,
            mean,
            median: with_median.then_some(medians),
        }
    }

    /// How native time steps combine when bucketed to a coarser resolution.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Aggregation {
        Mean,
        /// Accumulations such as QPF add up across the bucket.
        Sum,
    }

    impl Aggregation {
        pub fn for_dataset(dataset: GridDataset) -> Aggregation {
            match dataset {
                GridDataset::NdfdQpf => Aggregation::Sum,
                _ => Aggregation::Mean,
            }
        }

        fn combine(self, values: &[f64]) -> f64 {
            let sum: f64 = values.iter().sum();
            match self {
                Aggregation::Sum => sum,
                Aggregation::Mean => sum / values.len() as f64,
            }
        }
    }

    fn bucket(
        stamps: &[NaiveDateTime],
        values: &[f64],
        resolution: Resolution,
        agg: Aggregation,
    ) -> BTreeMap<NaiveDateTime, f64> {
        let mut grouped: BTreeMap<NaiveDateTime, Vec<f64>> = BTreeMap::new();
        for (stamp, value) in stamps.iter().zip(values) {
            grouped.entry(floor_to(resolution, stamp)).or_default().push(*value);
        }
        grouped
            .into_iter()
            .map(|(stamp, vals)| (stamp, agg.combine(&vals)))
            .collect()
    }

    impl BasinAverage {
        /// Bucket the per-step statistics onto `resolution`. The spatial
        /// reduction has already happened, so a sum adds basin means.
        pub fn resample(&self, resolution: Resolution, agg: Aggregation) -> BasinAverage {
            let mean = bucket(&self.stamps, &self.mean, resolution, agg);
            let median = self
                .median
                .as_ref()
                .map(|m| bucket(&self.stamps, m, resolution, agg).into_values().collect());
            BasinAverage {
                stamps: mean.keys().copied().collect(),
                mean: mean.into_values().collect(),
                median,
            }
        }
    }

}

/// Derived quantities computed from aligned series.
pub mod derived {
    use shread_core::units::{albedo, celsius_to_fahrenheit, inverted_albedo_percent};

    /// Celsius series to Fahrenheit.
    pub fn to_fahrenheit(values: &[Option<f64>]) -> Vec<Option<f64>> {
        crate::series::map_values(values, celsius_to_fahrenheit)
    }

    /// "100% - albedo" from aligned pyranometer series.
    ///
    /// Albedo is clipped to [0, 1] before inverting, so every present value
    /// lies in [0, 100].
    pub fn inverted_albedo_series(
        py_down: &[Option<f64>],
        py_up: &[Option<f64>],
    ) -> Vec<Option<f64>> {
        py_down
            .iter()
            .zip(py_up.iter())
            .map(|(down, up)| albedo(*down, *up).map(inverted_albedo_percent))
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_to_fahrenheit() {
            assert_eq!(
                to_fahrenheit(&[Some(0.0), None, Some(-40.0)]),
                vec![Some(32.0), None, Some(-40.0)]
            );
        }

        #[test]
        fn test_inverted_albedo_series_clips() {
            let down = [Some(80.0), Some(120.0), Some(-5.0), None, Some(10.0)];
            let up = [Some(100.0), Some(100.0), Some(100.0), Some(100.0), Some(0.0)];
            let out = inverted_albedo_series(&down, &up);
            assert!((out[0].unwrap() - 20.0).abs() < 1e-9);
            assert_eq!(out[1], Some(0.0));
            assert_eq!(out[2], Some(100.0));
            assert_eq!(out[3], None);
            assert_eq!(out[4], None);
        }
    }
}

/// Axis ranges shared by all traces of one figure.
pub mod axis {
    use crate::series::{nan_max, nan_min};
    use serde::Serialize;

    /// Freezing point reference line, degrees F.
    pub const FREEZE_F: f64 = 32.0;
    /// Headroom multiplier above the highest primary-axis curve.
    pub const HEADROOM: f64 = 1.25;
    /// Smallest precipitation maximum used for the secondary axis, inches.
    pub const PRECIP_FLOOR_IN: f64 = 0.2;
    /// Stretch applied to the secondary axis so bars hang from the top.
    pub const PRECIP_MULTIPLIER: f64 = 5.0;

    /// Running extrema of every series that will be plotted.
    ///
    /// A family that contributes nothing stays `None` and drops out of the
    /// reductions, so the range formulas need no special cases.
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub struct AxisExtents {
        pub temp_min: Option<f64>,
        pub primary_max: Option<f64>,
        pub precip_max: Option<f64>,
    }

    /// Final ranges. The secondary range is inverted: `[top, 0]`.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct AxisRanges {
        pub primary: [f64; 2],
        pub secondary: [f64; 2],
    }

    impl AxisExtents {
        /// A temperature-like series: contributes to both ends of the primary axis.
        pub fn add_temperature(&mut self, values: &[Option<f64>]) {
            self.temp_min = nan_min([self.temp_min, nan_min(values.iter().copied())]);
            self.add_upper(values);
        }

        /// A series that only raises the primary-axis ceiling (forcing, albedo).
        pub fn add_upper(&mut self, values: &[Option<f64>]) {
            self.primary_max = nan_max([self.primary_max, nan_max(values.iter().copied())]);
        }

        pub fn add_precipitation(&mut self, values: &[Option<f64>]) {
            self.precip_max = nan_max([self.precip_max, nan_max(values.iter().copied())]);
        }

        /// `[min(temp_min, 0), max(primary_max, 32) * 1.25]`
        pub fn primary_range(&self) -> [f64; 2] {
            let lower = nan_min([self.temp_min, Some(0.0)]).unwrap_or(0.0);
            let upper = nan_max([self.primary_max, Some(FREEZE_F)]).unwrap_or(FREEZE_F) * HEADROOM;
            [lower, upper]
        }

        /// `[max(precip_max, 0.2) * 5, 0]`
        pub fn secondary_range(&self) -> [f64; 2] {
            let top = nan_max([self.precip_max, Some(PRECIP_FLOOR_IN)]).unwrap_or(PRECIP_FLOOR_IN)
                * PRECIP_MULTIPLIER;
            [top, 0.0]
        }

        pub fn ranges(&self) -> AxisRanges {
            AxisRanges {
                primary: self.primary_range(),
                secondary: self.secondary_range(),
            }
        }
    }

}
