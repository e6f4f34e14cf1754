//! Typed query methods for retrieving cached data.
//!
//! Site queries return [`SiteFrame`]s ready for alignment onto a date
//! index; the spatial screen returns the raw [`GridValue`]s that passed the
//! basin and attribute filters, leaving the per-timestamp reduction to
//! `shread-data`.

use crate::models::{CacheExtent, GridExtent, GridValue};
use crate::Database;
use chrono::NaiveDate;
use rusqlite::params;
use shread_core::date_index::Resolution;
use shread_core::grid::{BasinFilter, GridDataset};
use shread_core::observation::{ObservationSource, SiteFrame};
use shread_utils::dates::parse_datetime;

/// Inclusive text bounds covering every timestamp of the given dates.
fn day_bounds(start_date: &NaiveDate, end_date: &NaiveDate) -> (String, String) {
    (
        format!("{} 00:00:00", start_date.format("%Y-%m-%d")),
        format!("{} 23:59:59", end_date.format("%Y-%m-%d")),
    )
}

impl Database {
    // ───────────────────── Site Queries ─────────────────────

    /// Get the cached observations of one site for a date range.
    ///
    /// Only the requested variables are returned. An unknown site or an
    /// empty range yields an empty frame.
    pub fn query_site_observations(
        &self,
        site_id: &str,
        resolution: Resolution,
        variables: &[&str],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<SiteFrame> {
        let (start, end) = day_bounds(&start_date, &end_date);
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT datetime, variable, value FROM observations
             WHERE site_id = ?1 AND resolution = ?2
               AND datetime >= ?3 AND datetime <= ?4
             ORDER BY datetime",
        )?;
        let rows = stmt
            .query_map(params![site_id, resolution.code(), start, end], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut frame = SiteFrame::new(site_id);
        for (datetime, variable, value) in rows {
            if !variables.contains(&variable.as_str()) {
                continue;
            }
            frame.insert(parse_datetime(&datetime)?, &variable, value);
        }
        log::info!(
            "[SHREAD] query: query_site_observations returned {} timestamps for {}",
            frame.len(),
            site_id
        );
        Ok(frame)
    }

    /// Coverage of every cached site/resolution pair, ordered by site.
    pub fn query_cache_extents(&self) -> anyhow::Result<Vec<CacheExtent>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT site_id, resolution, MIN(datetime), MAX(datetime), COUNT(*)
             FROM observations
             GROUP BY site_id, resolution
             ORDER BY site_id, resolution",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CacheExtent {
                    site_id: row.get(0)?,
                    resolution: row.get(1)?,
                    first: row.get(2)?,
                    last: row.get(3)?,
                    count: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ───────────────────── Grid Queries ─────────────────────

    /// Spatial screen: values of a gridded dataset whose cells lie in the
    /// filter's basin and attribute ranges (inclusive), within the dates.
    ///
    /// Ordered by datetime then point. An empty result means no cell
    /// passed the screen or no values exist in range.
    pub fn screen_points(
        &self,
        dataset: GridDataset,
        filter: &BasinFilter,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<Vec<GridValue>> {
        let (start, end) = day_bounds(&start_date, &end_date);
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT v.point_id, v.datetime, v.value
             FROM grid_values v
             INNER JOIN grid_points p
                ON v.dataset = p.dataset AND v.point_id = p.point_id
             WHERE v.dataset = ?1
               AND p.basin = ?2
               AND p.elevation_ft BETWEEN ?3 AND ?4
               AND p.aspect_deg BETWEEN ?5 AND ?6
               AND p.slope_deg BETWEEN ?7 AND ?8
               AND v.datetime >= ?9 AND v.datetime <= ?10
             ORDER BY v.datetime, v.point_id",
        )?;
        let rows = stmt
            .query_map(
                params![
                    dataset.key(),
                    filter.basin,
                    filter.elevation.min,
                    filter.elevation.max,
                    filter.aspect.min,
                    filter.aspect.max,
                    filter.slope.min,
                    filter.slope.max,
                    start,
                    end
                ],
                |row| {
                    Ok(GridValue {
                        point_id: row.get(0)?,
                        datetime: row.get(1)?,
                        value: row.get(2)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[SHREAD] query: screen_points returned {} {} values in {}",
            rows.len(),
            dataset.key(),
            filter.basin
        );
        Ok(rows)
    }

    /// Coverage of every gridded dataset present in the cache.
    pub fn query_grid_extents(&self) -> anyhow::Result<Vec<GridExtent>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT p.dataset, COUNT(*),
                    (SELECT MIN(datetime) FROM grid_values v WHERE v.dataset = p.dataset),
                    (SELECT MAX(datetime) FROM grid_values v WHERE v.dataset = p.dataset)
             FROM grid_points p
             GROUP BY p.dataset
             ORDER BY p.dataset",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(GridExtent {
                    dataset: row.get(0)?,
                    points: row.get(1)?,
                    first: row.get(2)?,
                    last: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// The cache as an offline Data Screener.
impl ObservationSource for Database {
    fn screen(
        &self,
        site_id: &str,
        variables: &[&str],
        start_date: NaiveDate,
        end_date: NaiveDate,
        resolution: Resolution,
    ) -> SiteFrame {
        match self.query_site_observations(site_id, resolution, variables, start_date, end_date) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("[SHREAD] query: cache read failed for {}: {}", site_id, e);
                SiteFrame::new(site_id)
            }
        }
    }
}
