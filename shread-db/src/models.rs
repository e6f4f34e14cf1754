//! Query result model structs for the observation cache.

use serde::Serialize;

/// One cell value of a gridded dataset that passed the spatial screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridValue {
    pub point_id: String,
    /// Timestamp in `YYYY-MM-DD HH:MM:SS` form.
    pub datetime: String,
    pub value: f64,
}

/// Coverage of one cached site/resolution pair, for the `cache-info` report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheExtent {
    pub site_id: String,
    /// `dv` or `iv`.
    pub resolution: String,
    pub first: String,
    pub last: String,
    /// Number of stored values across all variables.
    pub count: i64,
}

/// Coverage of one gridded dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GridExtent {
    pub dataset: String,
    pub points: i64,
    pub first: Option<String>,
    pub last: Option<String>,
}
