//! SQLite cache layer for SHREAD meteorology data.
//!
//! This crate is the offline half of the Data Screeners and the storage
//! behind the Spatial Screener. Cached exports (CSAS study plot logs,
//! SNOTEL pulls, gridded forcing and NDFD forecast cells) are loaded from
//! CSV into SQLite and read back through typed query methods.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper: the plot runs single-threaded and a
//!   `Database` is cheaply cloned into each request context
//! - In-memory SQLite for tests and one-shot runs, file-backed for a
//!   persistent cache
//! - Typed query methods returning [`shread_core::observation::SiteFrame`]
//!   or serializable structs from [`models`]
//!
//! # Usage
//!
//! ```rust
//! use shread_db::Database;
//! use shread_core::date_index::Resolution;
//! use chrono::NaiveDate;
//!
//! let db = Database::new().unwrap();
//! db.load_observations("SASP,dv,2021-12-03,UpAir_Avg_C,-4.5\n").unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2021, 12, 3).unwrap();
//! let frame = db
//!     .query_site_observations("SASP", Resolution::Daily, &["UpAir_Avg_C"], day, day)
//!     .unwrap();
//! assert_eq!(frame.len(), 1);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// SQLite database holding cached site observations and grid data.
///
/// This struct is cheaply cloneable (via `Rc`); clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    ///
    /// The database is empty after creation; use the `load_*` methods
    /// to populate it with CSV data.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) a file-backed cache and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::info!("[SHREAD] db: Opened cache at {}", path.as_ref().display());
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_creates_successfully() {
        let db = Database::new();
        assert!(db.is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_observations("SASP,dv,2021-12-03,UpAir_Avg_C,-4.5\n")
            .unwrap();
        let extents = db2.query_cache_extents().unwrap();
        assert_eq!(extents.len(), 1, "Clone should see same data via shared Rc");
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        let extents = db.query_cache_extents().unwrap();
        assert!(extents.is_empty(), "New database should have no observations");
    }
}
