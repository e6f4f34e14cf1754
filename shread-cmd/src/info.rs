//! `cache-info`: report what the configured cache files cover.

use crate::cache::open_cache;
use crate::settings::Settings;
use serde::Serialize;
use shread_db::models::{CacheExtent, GridExtent};
use shread_db::Database;

#[derive(Debug, Serialize)]
pub struct CacheReport {
    pub sites: Vec<CacheExtent>,
    pub grids: Vec<GridExtent>,
}

pub fn cache_report(db: &Database) -> anyhow::Result<CacheReport> {
    Ok(CacheReport {
        sites: db.query_cache_extents()?,
        grids: db.query_grid_extents()?,
    })
}

/// Plain-text table, one line per site/resolution and per dataset.
pub fn format_report(report: &CacheReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {:<3} {:<19} {:<19} {:>8}\n",
        "SITE", "RES", "FIRST", "LAST", "VALUES"
    ));
    for e in &report.sites {
        out.push_str(&format!(
            "{:<14} {:<3} {:<19} {:<19} {:>8}\n",
            e.site_id, e.resolution, e.first, e.last, e.count
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "{:<14} {:<19} {:<19} {:>8}\n",
        "DATASET", "FIRST", "LAST", "POINTS"
    ));
    for g in &report.grids {
        out.push_str(&format!(
            "{:<14} {:<19} {:<19} {:>8}\n",
            g.dataset,
            g.first.as_deref().unwrap_or("-"),
            g.last.as_deref().unwrap_or("-"),
            g.points
        ));
    }
    out
}

pub fn run_cache_info(config: Option<&str>, json: bool) -> anyhow::Result<()> {
    let settings = Settings::load(config)?;
    let db = open_cache(&settings.cache)?;
    let report = cache_report(&db)?;
    log::info!(
        "[SHREAD] cache-info: {} site series, {} grid datasets",
        report.sites.len(),
        report.grids.len()
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lists_sites_and_grids() {
        let db = Database::new().unwrap();
        db.load_observations(
            "SASP,dv,2021-12-03,UpAir_Avg_C,-4.5\nSASP,dv,2021-12-04,UpAir_Avg_C,-6.0\n",
        )
        .unwrap();
        db.load_grid_points("DATASET,POINT_ID,BASIN,ELEV_FT,ASPECT,SLOPE\nforcing,p001,Animas,11200,135,18\n")
            .unwrap();
        let report = cache_report(&db).unwrap();
        assert_eq!(report.sites.len(), 1);
        assert_eq!(report.sites[0].count, 2);
        assert_eq!(report.grids.len(), 1);
        assert_eq!(report.grids[0].first, None);

        let text = format_report(&report);
        assert!(text.contains("SASP"));
        assert!(text.contains("2021-12-04 00:00:00"));
        assert!(text.contains("forcing"));
    }
}
