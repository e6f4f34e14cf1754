use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shread_core::date_index::Resolution;
use shread_core::grid::{AttrRange, BasinFilter, GridDataset};

/// NWS forecast overlays that can be added to the figure.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastVar {
    Temperature,
    Precipitation,
}

impl ForecastVar {
    pub fn dataset(&self) -> GridDataset {
        match self {
            ForecastVar::Temperature => GridDataset::NdfdTemp,
            ForecastVar::Precipitation => GridDataset::NdfdQpf,
        }
    }
}

/// Where SNOTEL observations come from.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Read the local cache only.
    #[default]
    Offline,
    /// Fetch from AWDB at request time.
    Live,
}

/// Every user input of the meteorology panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetPlotRequest {
    pub basin: String,
    pub elevation: AttrRange,
    pub aspect: AttrRange,
    pub slope: AttrRange,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub snotel_sel: Vec<String>,
    #[serde(default)]
    pub csas_sel: Vec<String>,
    #[serde(default)]
    pub plot_albedo: bool,
    #[serde(default)]
    pub plot_forcing: bool,
    pub resolution: Resolution,
    #[serde(default)]
    pub forecast_vars: Vec<ForecastVar>,
    /// First forecast day; defaults to today (UTC) when absent.
    #[serde(default)]
    pub forecast_start: Option<NaiveDate>,
    #[serde(default)]
    pub mode: SourceMode,
}

impl MetPlotRequest {
    /// An otherwise empty daily request over the Animas basin at any
    /// elevation, aspect and slope.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        MetPlotRequest {
            basin: "Animas".to_string(),
            elevation: AttrRange::new(0.0, 15000.0),
            aspect: AttrRange::new(0.0, 360.0),
            slope: AttrRange::new(0.0, 90.0),
            start_date,
            end_date,
            snotel_sel: Vec::new(),
            csas_sel: Vec::new(),
            plot_albedo: false,
            plot_forcing: false,
            resolution: Resolution::Daily,
            forecast_vars: Vec::new(),
            forecast_start: None,
            mode: SourceMode::Offline,
        }
    }

    /// Reject requests no figure can be built for. An inverted attribute
    /// range is not one of them: it screens out every grid point.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.start_date > self.end_date {
            bail!(
                "start date {} is after end date {}",
                self.start_date,
                self.end_date
            );
        }
        Ok(())
    }

    pub fn basin_filter(&self) -> BasinFilter {
        BasinFilter {
            basin: self.basin.clone(),
            elevation: self.elevation,
            aspect: self.aspect,
            slope: self.slope,
        }
    }

    pub fn wants_forecast(&self, var: ForecastVar) -> bool {
        self.forecast_vars.contains(&var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_accepts_single_day() {
        let req = MetPlotRequest::new(ymd(2021, 12, 3), ymd(2021, 12, 3));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_reversed_dates() {
        let req = MetPlotRequest::new(ymd(2021, 12, 14), ymd(2021, 12, 3));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_validate_allows_inverted_range() {
        let mut req = MetPlotRequest::new(ymd(2021, 12, 3), ymd(2021, 12, 14));
        req.slope = AttrRange::new(30.0, 10.0);
        assert!(req.validate().is_ok());
        assert!(!req.basin_filter().is_satisfiable());
    }

    #[test]
    fn test_request_from_json_uses_defaults() {
        let json = r#"{
            "basin": "Animas",
            "elevation": {"min": 9000, "max": 12000},
            "aspect": {"min": 0, "max": 360},
            "slope": {"min": 0, "max": 30},
            "start_date": "2021-12-03",
            "end_date": "2021-12-14",
            "resolution": "dv",
            "csas_sel": ["SASP"],
            "forecast_vars": ["temperature"]
        }"#;
        let req: MetPlotRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.resolution, Resolution::Daily);
        assert_eq!(req.mode, SourceMode::Offline);
        assert!(req.snotel_sel.is_empty());
        assert!(req.wants_forecast(ForecastVar::Temperature));
        assert!(!req.wants_forecast(ForecastVar::Precipitation));
        assert_eq!(req.forecast_start, None);
    }
}
