//! Optional TOML settings for the CLI.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//!
//! ```toml
//! [cache]
//! database = "shread_cache.db"
//! observations = ["data/snotel_dv.csv.gz"]
//! grid_points = ["data/grid_points.csv"]
//! grid_values = ["data/forcing.csv.gz", "data/ndfd.csv.gz"]
//!
//! [[cache.csas_exports]]
//! site_id = "SASP"
//! resolution = "dv"
//! path = "data/SASP_dv.csv"
//!
//! [awdb]
//! base_url = "https://wcc.sc.egov.usda.gov/reportGenerator/view_csv"
//! timeout_secs = 60
//! max_tries = 3
//! ```

use serde::Deserialize;
use shread_core::awdb::DEFAULT_BASE_URL;
use shread_core::date_index::Resolution;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cache: CacheSettings,
    pub awdb: AwdbSettings,
}

/// Files that populate the cache database at start-up.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// SQLite file to open; in-memory when absent.
    pub database: Option<String>,
    /// Long-form observation CSVs (`site_id,resolution,datetime,variable,value`).
    pub observations: Vec<String>,
    /// Wide-form CSAS logger exports, one per site and resolution.
    pub csas_exports: Vec<CsasExport>,
    pub grid_points: Vec<String>,
    pub grid_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CsasExport {
    pub site_id: String,
    pub resolution: Resolution,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AwdbSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_tries: u32,
}

impl Default for AwdbSettings {
    fn default() -> Self {
        AwdbSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            max_tries: 3,
        }
    }
}

impl AwdbSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&str>) -> anyhow::Result<Settings> {
        match path {
            Some(p) => Settings::from_file(p),
            None => Ok(Settings::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Settings> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Failed to read settings {}: {}", path.as_ref().display(), e)
        })?;
        let settings: Settings = toml::from_str(&content)?;
        log::info!("[SHREAD] settings: Loaded {}", path.as_ref().display());
        Ok(settings)
    }
}
