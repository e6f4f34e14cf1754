//! CSV data loading functions for populating the cache database.
//!
//! Each loader method parses CSV data from a string slice and inserts rows
//! into the corresponding table. Timestamps are normalized to
//! `YYYY-MM-DD HH:MM:SS`; rows with unparseable timestamps or non-numeric
//! values are skipped and counted.
//!
//! # CSV Formats
//!
//! - **Observations** (no headers): `site_id,resolution(dv|iv),datetime,variable,value`
//! - **CSAS logger export** (has headers): `date,<variable>,<variable>,...` for one site
//! - **Grid points** (has headers): `DATASET,POINT_ID,BASIN,ELEV_FT,ASPECT,SLOPE`
//! - **Grid values** (no headers): `dataset,point_id,datetime,value`

use crate::Database;
use rusqlite::params;
use shread_core::date_index::Resolution;
use shread_utils::dates::{format_datetime, parse_datetime};

/// Normalize a timestamp field, or `None` if it cannot be parsed.
fn normalize_datetime(raw: &str) -> Option<String> {
    parse_datetime(raw).ok().map(|dt| format_datetime(&dt))
}

impl Database {
    /// Load long-form site observations from CSV string.
    ///
    /// Expected format (no headers): `site_id,resolution,datetime,variable,value`
    ///
    /// # Example CSV
    /// ```text
    /// SASP,dv,2021-12-03,UpAir_Avg_C,-4.5
    /// 713:CO:SNTL,dv,2021-12-03,TAVG,24
    /// ```
    pub fn load_observations(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let site_id = r.get(0).unwrap_or("").trim();
            let resolution = match Resolution::from_code(r.get(1).unwrap_or("")) {
                Some(res) => res,
                None => { skipped += 1; continue; }
            };
            let datetime = match normalize_datetime(r.get(2).unwrap_or("")) {
                Some(dt) => dt,
                None => { skipped += 1; continue; }
            };
            let variable = r.get(3).unwrap_or("").trim();

            // Skip non-numeric values (NaN, ---, blank)
            let value: f64 = match r.get(4).unwrap_or("").trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => { skipped += 1; continue; }
            };

            if site_id.is_empty() || variable.is_empty() {
                skipped += 1;
                continue;
            }

            conn.execute(
                "INSERT OR REPLACE INTO observations (site_id, resolution, datetime, variable, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![site_id, resolution.code(), datetime, variable, value],
            )?;
            count += 1;
        }
        log::info!("[SHREAD] loader: Loaded {} observations, skipped {} invalid", count, skipped);
        Ok(())
    }

    /// Load one CSAS logger export (wide form) for a single site.
    ///
    /// Expected format (with headers): the first column is the timestamp,
    /// every other column is a variable named by its header. Blank and
    /// non-numeric cells are skipped.
    ///
    /// # Example CSV
    /// ```text
    /// date,UpAir_Avg_C,PyUp_Unfilt_W,PyDwn_Unfilt_W
    /// 2021-12-03,-4.5,180.2,160.0
    /// ```
    pub fn load_csas_export(
        &self,
        site_id: &str,
        resolution: Resolution,
        csv_data: &str,
    ) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let datetime = match normalize_datetime(r.get(0).unwrap_or("")) {
                Some(dt) => dt,
                None => { skipped += 1; continue; }
            };
            for (variable, cell) in headers.iter().zip(r.iter()).skip(1) {
                let value = match cell.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => v,
                    _ => { skipped += 1; continue; }
                };
                conn.execute(
                    "INSERT OR REPLACE INTO observations (site_id, resolution, datetime, variable, value)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![site_id, resolution.code(), datetime, variable, value],
                )?;
                count += 1;
            }
        }
        log::info!(
            "[SHREAD] loader: Loaded {} {} values for {}, skipped {} invalid",
            count,
            resolution.code(),
            site_id,
            skipped
        );
        Ok(())
    }

    /// Load grid point attributes from CSV string.
    ///
    /// Expected format (with headers): `DATASET,POINT_ID,BASIN,ELEV_FT,ASPECT,SLOPE`
    ///
    /// # Example CSV
    /// ```text
    /// DATASET,POINT_ID,BASIN,ELEV_FT,ASPECT,SLOPE
    /// forcing,p001,Animas,11200,135,18
    /// ```
    pub fn load_grid_points(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let dataset = r.get(0).unwrap_or("").trim();
            let point_id = r.get(1).unwrap_or("").trim();
            let basin = r.get(2).unwrap_or("").trim();
            let attrs: Option<Vec<f64>> = (3..6)
                .map(|i| r.get(i).and_then(|s| s.trim().parse::<f64>().ok()))
                .collect();
            let attrs = match attrs {
                Some(a) if !dataset.is_empty() && !point_id.is_empty() => a,
                _ => { skipped += 1; continue; }
            };

            conn.execute(
                "INSERT OR REPLACE INTO grid_points
                 (dataset, point_id, basin, elevation_ft, aspect_deg, slope_deg)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![dataset, point_id, basin, attrs[0], attrs[1], attrs[2]],
            )?;
            count += 1;
        }
        log::info!("[SHREAD] loader: Loaded {} grid points, skipped {} invalid", count, skipped);
        Ok(())
    }

    /// Load gridded values from CSV string.
    ///
    /// Expected format (no headers): `dataset,point_id,datetime,value`
    ///
    /// # Example CSV
    /// ```text
    /// forcing,p001,2021-12-03,42.5
    /// ndfd_temp,p001,2021-12-15 06:00,-8.0
    /// ```
    pub fn load_grid_values(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let dataset = r.get(0).unwrap_or("").trim();
            let point_id = r.get(1).unwrap_or("").trim();
            let datetime = match normalize_datetime(r.get(2).unwrap_or("")) {
                Some(dt) => dt,
                None => { skipped += 1; continue; }
            };
            let value: f64 = match r.get(3).unwrap_or("").trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => { skipped += 1; continue; }
            };
            if dataset.is_empty() || point_id.is_empty() {
                skipped += 1;
                continue;
            }

            conn.execute(
                "INSERT OR REPLACE INTO grid_values (dataset, point_id, datetime, value)
                 VALUES (?1, ?2, ?3, ?4)",
                params![dataset, point_id, datetime, value],
            )?;
            count += 1;
        }
        log::info!("[SHREAD] loader: Loaded {} grid values, skipped {} invalid", count, skipped);
        Ok(())
    }
}
