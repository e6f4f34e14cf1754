//! Cache files on disk: plain or gzip CSV, loaded into the cache database.

use crate::settings::CacheSettings;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use shread_db::Database;
use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("gz")
}

/// Read a cache file, decompressing `.gz` files.
pub fn read_text<P: AsRef<Path>>(path: P) -> anyhow::Result<String> {
    let path = path.as_ref();
    let mut contents = String::new();
    if is_gzip(path) {
        let file = fs::File::open(path)?;
        let mut reader = BufReader::new(GzDecoder::new(BufReader::new(file)));
        reader.read_to_string(&mut contents)?;
    } else {
        contents = fs::read_to_string(path)?;
    }
    Ok(contents)
}

/// Write a cache file, compressing when the path ends in `.gz`.
pub fn write_text<P: AsRef<Path>>(path: P, contents: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    if is_gzip(path) {
        let file = fs::File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(contents.as_bytes())?;
        encoder.finish()?;
    } else {
        fs::write(path, contents)?;
    }
    Ok(())
}

/// Open the cache database and load every configured file into it.
pub fn open_cache(settings: &CacheSettings) -> anyhow::Result<Database> {
    let db = match &settings.database {
        Some(path) => Database::open(path)?,
        None => Database::new()?,
    };
    for path in &settings.observations {
        log::info!("[SHREAD] cache: Loading observations from {}", path);
        db.load_observations(&read_text(path)?)?;
    }
    for export in &settings.csas_exports {
        log::info!("[SHREAD] cache: Loading {} export from {}", export.site_id, export.path);
        db.load_csas_export(&export.site_id, export.resolution, &read_text(&export.path)?)?;
    }
    for path in &settings.grid_points {
        log::info!("[SHREAD] cache: Loading grid points from {}", path);
        db.load_grid_points(&read_text(path)?)?;
    }
    for path in &settings.grid_values {
        log::info!("[SHREAD] cache: Loading grid values from {}", path);
        db.load_grid_values(&read_text(path)?)?;
    }
    Ok(db)
}
