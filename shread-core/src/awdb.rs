//! NRCS AWDB report generator client for live SNOTEL data.
//!
//! The report generator returns CSV with a block of `#` comment lines,
//! one header row and one row per timestamp:
//!
//! ```text
//! #------------------- WARNING -------------------
//! # Provisional data, subject to revision.
//! Date,Red Mountain Pass (713) Air Temperature Average (degF),Red Mountain Pass (713) Precipitation Increment (in)
//! 2021-12-03,24,0.0
//! ```
//!
//! URL construction and parsing are always compiled; the HTTP client
//! itself needs the `api` feature.

use crate::date_index::Resolution;
use crate::error::{FetchError, Result};
use crate::observation::SiteFrame;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use shread_utils::dates::parse_datetime;

#[cfg(feature = "api")]
use crate::observation::ObservationSource;
#[cfg(feature = "api")]
use log::{info, warn};
#[cfg(feature = "api")]
use std::{thread::sleep, time::Duration};

/// Default report generator endpoint.
pub const DEFAULT_BASE_URL: &str = "https://wcc.sc.egov.usda.gov/reportGenerator/view_csv";

/// Date format used in report generator URLs: "YYYY-MM-DD"
pub const YEAR_FORMAT: &str = "%Y-%m-%d";

/// AWDB element code for one of our variable names.
///
/// `PREC` is requested as the daily increment (`PRCP`) because the plot
/// draws per-period bars.
pub fn element_code(variable: &str) -> &str {
    match variable {
        "PREC" => "PRCP",
        other => other,
    }
}

/// Build the report generator URL for one station.
pub fn build_report_url(
    base_url: &str,
    site_id: &str,
    variables: &[&str],
    start_date: &NaiveDate,
    end_date: &NaiveDate,
    resolution: Resolution,
) -> String {
    let period = match resolution {
        Resolution::Daily => "daily",
        Resolution::Instantaneous => "hourly",
    };
    let elements = variables
        .iter()
        .map(|v| format!("{}::value", element_code(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}/customSingleStationReport/{}/{}%7Cid%3D%22%22%7Cname/{},{}/{}",
        base_url.trim_end_matches('/'),
        period,
        site_id,
        start_date.format(YEAR_FORMAT),
        end_date.format(YEAR_FORMAT),
        elements
    )
}

/// Parse a report generator CSV body into a frame.
///
/// Value columns are matched to `variables` by position, which is how the
/// report generator orders them. Blank cells are gaps.
pub fn parse_report_csv(site_id: &str, variables: &[&str], body: &str) -> Result<SiteFrame> {
    let data: String = body
        .lines()
        .filter(|l| !l.trim_start().starts_with('#') && !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if data.is_empty() {
        return Err(FetchError::EmptyResponse(site_id.to_string()));
    }
    let mut frame = SiteFrame::new(site_id);
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());
    for result in rdr.records() {
        let record = result?;
        let stamp = record.get(0).unwrap_or("");
        let datetime = parse_datetime(stamp).map_err(|_| FetchError::DateParse(stamp.to_string()))?;
        for (i, variable) in variables.iter().enumerate() {
            if let Some(v) = record.get(i + 1).and_then(|s| s.trim().parse::<f64>().ok()) {
                frame.insert(datetime, variable, v);
            }
        }
    }
    Ok(frame)
}

/// Blocking AWDB client with retry and exponential backoff.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct AwdbClient {
    client: reqwest::blocking::Client,
    base_url: String,
    max_tries: u32,
}

#[cfg(feature = "api")]
impl AwdbClient {
    pub fn new(base_url: &str, timeout: Duration, max_tries: u32) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(AwdbClient {
            client,
            base_url: base_url.to_string(),
            max_tries: max_tries.max(1),
        })
    }

    /// Fetch one station's report and parse it.
    pub fn fetch(
        &self,
        site_id: &str,
        variables: &[&str],
        start_date: &NaiveDate,
        end_date: &NaiveDate,
        resolution: Resolution,
    ) -> Result<SiteFrame> {
        let url = build_report_url(&self.base_url, site_id, variables, start_date, end_date, resolution);
        let mut sleep_millis: u64 = 1000;
        for attempt in 1..=self.max_tries {
            match self.try_once(&url) {
                Ok(body) => return parse_report_csv(site_id, variables, &body),
                Err(e) => warn!(
                    "Attempt {}/{}: AWDB request failed for {}: {}",
                    attempt, self.max_tries, site_id, e
                ),
            }
            if attempt < self.max_tries {
                info!(
                    "Sleeping for {} milliseconds before retry for {}",
                    sleep_millis, site_id
                );
                sleep(Duration::from_millis(sleep_millis));
                sleep_millis *= 2;
            }
        }
        Err(FetchError::RetriesExhausted {
            site: site_id.to_string(),
            attempts: self.max_tries,
        })
    }

    fn try_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(FetchError::BadStatus(response.status().as_u16()));
        }
        let body = response.text()?;
        if body.len() <= 2 {
            return Err(FetchError::EmptyResponse(url.to_string()));
        }
        Ok(body)
    }
}

#[cfg(feature = "api")]
impl ObservationSource for AwdbClient {
    fn screen(
        &self,
        site_id: &str,
        variables: &[&str],
        start_date: NaiveDate,
        end_date: NaiveDate,
        resolution: Resolution,
    ) -> SiteFrame {
        match self.fetch(site_id, variables, &start_date, &end_date, resolution) {
            Ok(frame) => {
                info!("[SHREAD] awdb: {} rows for {}", frame.len(), site_id);
                frame
            }
            Err(e) => {
                warn!("[SHREAD] awdb: no live data for {}: {}", site_id, e);
                SiteFrame::new(site_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const BODY: &str = "\
#------------------------------------------------- WARNING --------------------------------------------
# The data you have obtained from this automated Natural Resources Conservation Service
# database are subject to revision regardless of indicated Quality Assurance level.
#
Date,Red Mountain Pass (713) Air Temperature Average (degF),Red Mountain Pass (713) Precipitation Increment (in)
2021-12-03,24,0.0
2021-12-04,18,0.3
2021-12-05,,0.1
";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_build_report_url() {
        let url = build_report_url(
            DEFAULT_BASE_URL,
            "713:CO:SNTL",
            &["TAVG", "PREC"],
            &ymd(2021, 12, 3),
            &ymd(2021, 12, 14),
            Resolution::Daily,
        );
        assert_eq!(
            url,
            "https://wcc.sc.egov.usda.gov/reportGenerator/view_csv/customSingleStationReport/daily/\
713:CO:SNTL%7Cid%3D%22%22%7Cname/2021-12-03,2021-12-14/TAVG::value,PRCP::value"
        );
    }

    #[test]
    fn test_parse_report_csv() {
        let frame = parse_report_csv("713:CO:SNTL", &["TAVG", "PREC"], BODY).unwrap();
        assert_eq!(frame.len(), 3);
        let day = |d| ymd(2021, 12, d).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(frame.value(&day(3), "TAVG"), Some(24.0));
        assert_eq!(frame.value(&day(4), "PREC"), Some(0.3));
        assert_eq!(frame.value(&day(5), "TAVG"), None);
        assert_eq!(frame.value(&day(5), "PREC"), Some(0.1));
    }

    #[test]
    fn test_parse_comment_only_body_is_empty_response() {
        let body = "# nothing here\n#\n";
        assert!(matches!(
            parse_report_csv("713:CO:SNTL", &["TAVG"], body),
            Err(FetchError::EmptyResponse(_))
        ));
    }

    #[test]
    fn test_parse_header_only_body_yields_empty_frame() {
        let body = "Date,TAVG\n";
        let frame = parse_report_csv("713:CO:SNTL", &["TAVG"], body).unwrap();
        assert!(frame.is_empty());
    }
}
