use std::path::Path;

use rusqlite::Connection;

mod error;
mod migrations;
mod points;
pub mod storage;
mod types;

pub use error::{DbError, Result};
pub use storage::{
    MemoryStorage, SqliteStorage, StorageAdapter, StorageBackend, StorageConfig, StorageError,
    StorageSelection, select_storage,
};
pub use types::{CycleRecord, MetricPoint};

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    /// True once `migrate` has created the point tables.
    pub fn is_migrated(&self) -> Result<bool> {
        Ok(migrations::table_exists(&self.conn, "metric_point")?
            && migrations::table_exists(&self.conn, "pipeline_cycle")?)
    }
}
