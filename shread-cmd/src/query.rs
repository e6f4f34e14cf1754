//! `snotel-query`: fetch SNOTEL observations from AWDB into a cache file.
//!
//! Incremental by default: when the output file already holds rows for a
//! site, only the days after its last stored date are requested.

use crate::cache::{read_text, write_text};
use crate::settings::Settings;
use anyhow::bail;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use log::{info, warn};
use shread_core::awdb::AwdbClient;
use shread_core::date_index::Resolution;
use shread_core::observation::SiteFrame;
use shread_core::site::{SiteFamily, SiteRegistry};
use shread_plot::assembler::{SNOTEL_PRECIP, SNOTEL_TEMP};
use shread_utils::dates::{format_date, parse_datetime};
use std::collections::HashMap;
use std::path::Path;

/// Most recent stored date per site in a long-form observation CSV.
pub fn find_max_dates(csv_data: &str) -> anyhow::Result<HashMap<String, NaiveDate>> {
    let mut max_dates: HashMap<String, NaiveDate> = HashMap::new();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    for result in rdr.records() {
        let record = result?;
        if let (Some(site_id), Some(raw)) = (record.get(0), record.get(2)) {
            if let Ok(dt) = parse_datetime(raw) {
                let date = dt.date();
                let current_max = max_dates.entry(site_id.trim().to_string()).or_insert(date);
                if date > *current_max {
                    *current_max = date;
                }
            }
        }
    }
    Ok(max_dates)
}

/// October 1 of the water year containing `date`.
pub fn water_year_start(date: &NaiveDate) -> NaiveDate {
    let year = if date.month() >= 10 { date.year() } else { date.year() - 1 };
    NaiveDate::from_ymd_opt(year, 10, 1).unwrap_or(*date)
}

/// Long-form cache rows (`site_id,dv,date,variable,value`) for one frame.
pub fn frame_rows(frame: &SiteFrame) -> Vec<String> {
    let mut rows = Vec::new();
    for stamp in frame.timestamps() {
        for var in [SNOTEL_TEMP, SNOTEL_PRECIP] {
            if let Some(v) = frame.value(stamp, var) {
                rows.push(format!(
                    "{},{},{},{},{}",
                    frame.site_id,
                    Resolution::Daily.code(),
                    format_date(&stamp.date()),
                    var,
                    v
                ));
            }
        }
    }
    rows
}

pub fn run_snotel_query(
    output: &str,
    sites: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let registry = SiteRegistry::load()?;
    let site_ids: Vec<String> = if sites.is_empty() {
        registry
            .sites(SiteFamily::Snotel)
            .iter()
            .map(|s| s.site_id.clone())
            .collect()
    } else {
        for s in sites {
            if registry.find_in(SiteFamily::Snotel, s).is_none() {
                bail!("unknown SNOTEL site {}", s);
            }
        }
        sites.to_vec()
    };

    let existing = if Path::new(output).exists() {
        read_text(output)?
    } else {
        String::new()
    };
    let max_dates = find_max_dates(&existing)?;
    let end_date = end.unwrap_or_else(|| Utc::now().date_naive());
    let default_start = start.unwrap_or_else(|| water_year_start(&end_date));

    let client = AwdbClient::new(
        &settings.awdb.base_url,
        settings.awdb.timeout(),
        settings.awdb.max_tries,
    )?;

    info!(
        "Querying {} SNOTEL sites through {}",
        site_ids.len(),
        end_date
    );

    let mut new_rows: Vec<String> = Vec::new();
    for site_id in &site_ids {
        let start_date = match max_dates.get(site_id) {
            Some(last) => *last + Duration::days(1),
            None => default_start,
        };
        if start_date > end_date {
            info!("Site {} is up to date", site_id);
            continue;
        }
        info!("Fetching {} from {} to {}", site_id, start_date, end_date);
        let frame = match client.fetch(
            site_id,
            &[SNOTEL_TEMP, SNOTEL_PRECIP],
            &start_date,
            &end_date,
            Resolution::Daily,
        ) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping {}: {}", site_id, e);
                continue;
            }
        };
        let rows = frame_rows(&frame);
        info!("  {} observations for {}", rows.len(), site_id);
        new_rows.extend(rows);

        // Be polite to the AWDB server
        std::thread::sleep(std::time::Duration::from_millis(500));
    }

    let mut output_text = existing;
    if !output_text.is_empty() && !output_text.ends_with('\n') {
        output_text.push('\n');
    }
    for row in &new_rows {
        output_text.push_str(row);
        output_text.push('\n');
    }
    write_text(output, &output_text)?;

    info!(
        "SNOTEL query complete. {} new observations written to {}",
        new_rows.len(),
        output
    );
    Ok(())
}
