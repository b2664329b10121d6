use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use youknow_core::TimeRange;

use super::{StorageAdapter, StorageError, StorageResult};
use crate::Db;
use crate::types::{CycleRecord, MetricPoint};

/// Durable storage; each call opens its own connection.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    path: PathBuf,
}

impl SqliteStorage {
    /// Opens and migrates the database once so later calls only need `Db::open`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut db = Db::open(&path)?;
        db.migrate()?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn db(&self) -> StorageResult<Db> {
        let db = Db::open(&self.path)?;
        if !db.is_migrated()? {
            return Err(StorageError::BackendUnreachable(format!(
                "{} is missing the point tables",
                self.path.display()
            )));
        }
        Ok(db)
    }
}

impl StorageAdapter for SqliteStorage {
    fn write(&self, cycle: &CycleRecord, points: &[MetricPoint]) -> StorageResult<usize> {
        let mut db = self.db()?;
        Ok(db.insert_cycle(cycle, points)?)
    }

    fn query(
        &self,
        metric: &str,
        window_days: u32,
        range: &TimeRange,
    ) -> StorageResult<Vec<MetricPoint>> {
        Ok(self.db()?.query_points(metric, window_days, range)?)
    }

    fn latest(&self) -> StorageResult<Option<(CycleRecord, Vec<MetricPoint>)>> {
        let db = self.db()?;
        let Some(cycle) = db.latest_cycle()? else {
            return Ok(None);
        };
        let points = db.points_at(cycle.ts)?;
        Ok(Some((cycle, points)))
    }

    fn delete_before(&self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        Ok(self.db()?.delete_before(cutoff)?)
    }

    fn health_check(&self) -> StorageResult<()> {
        self.db()?.count_points()?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn is_durable(&self) -> bool {
        true
    }
}
