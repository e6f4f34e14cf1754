//! Cache tables: long-form site observations and gridded datasets.

/// Schema batch applied on every open; `IF NOT EXISTS` keeps it safe on an
/// existing cache file.
///
/// `observations` holds one row per site, resolution, timestamp and
/// variable. `grid_points` holds the attributes the spatial screen filters
/// on and `grid_values` the per-cell series. Timestamps are
/// `YYYY-MM-DD HH:MM:SS` text so range filters compare lexically.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS observations (
        site_id TEXT NOT NULL,
        resolution TEXT NOT NULL,
        datetime TEXT NOT NULL,
        variable TEXT NOT NULL,
        value REAL NOT NULL,
        PRIMARY KEY (site_id, resolution, datetime, variable)
    );
    CREATE INDEX IF NOT EXISTS idx_obs_site ON observations(site_id, resolution);
    CREATE INDEX IF NOT EXISTS idx_obs_datetime ON observations(datetime);

    CREATE TABLE IF NOT EXISTS grid_points (
        dataset TEXT NOT NULL,
        point_id TEXT NOT NULL,
        basin TEXT NOT NULL,
        elevation_ft REAL NOT NULL,
        aspect_deg REAL NOT NULL,
        slope_deg REAL NOT NULL,
        PRIMARY KEY (dataset, point_id)
    );
    CREATE INDEX IF NOT EXISTS idx_grid_points_basin ON grid_points(dataset, basin);

    CREATE TABLE IF NOT EXISTS grid_values (
        dataset TEXT NOT NULL,
        point_id TEXT NOT NULL,
        datetime TEXT NOT NULL,
        value REAL NOT NULL,
        PRIMARY KEY (dataset, point_id, datetime)
    );
    CREATE INDEX IF NOT EXISTS idx_grid_values_datetime ON grid_values(dataset, datetime);
    "#
}
