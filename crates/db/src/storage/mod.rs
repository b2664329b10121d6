//! Pluggable persistence for metric points.
//!
//! The pipeline writes through [`StorageAdapter`] and never checks which
//! backend it got; [`select_storage`] decides once at startup.

mod memory;
mod sqlite;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use youknow_core::TimeRange;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use crate::error::DbError;
use crate::types::{CycleRecord, MetricPoint};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unreachable: {0}")]
    BackendUnreachable(String),
    #[error("invalid storage request: {0}")]
    InvalidRequest(String),
}

impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::TimeParse(err) => Self::InvalidRequest(err.to_string()),
            other => Self::BackendUnreachable(other.to_string()),
        }
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Time-series store the pipeline persists cycle outputs to.
pub trait StorageAdapter: Send + Sync {
    /// Writes one cycle's points; either all of them become visible or none.
    fn write(&self, cycle: &CycleRecord, points: &[MetricPoint]) -> StorageResult<usize>;

    /// Points of `metric` for `window_days` within `range`, oldest first.
    fn query(
        &self,
        metric: &str,
        window_days: u32,
        range: &TimeRange,
    ) -> StorageResult<Vec<MetricPoint>>;

    /// The most recent cycle and all of its points.
    fn latest(&self) -> StorageResult<Option<(CycleRecord, Vec<MetricPoint>)>>;

    /// Drops points older than `cutoff`, returning how many went.
    fn delete_before(&self, cutoff: DateTime<Utc>) -> StorageResult<usize>;

    fn health_check(&self) -> StorageResult<()>;

    fn backend_name(&self) -> &'static str;

    /// Whether points survive a restart.
    fn is_durable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub db_path: PathBuf,
}

/// The adapter chosen at startup, and whether it is a fallback.
#[derive(Clone)]
pub struct StorageSelection {
    pub adapter: Arc<dyn StorageAdapter>,
    pub fallback: bool,
    pub fallback_reason: Option<String>,
}

impl std::fmt::Debug for StorageSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSelection")
            .field("backend", &self.adapter.backend_name())
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Opens the configured backend, dropping to memory when SQLite cannot be opened.
pub fn select_storage(config: &StorageConfig) -> StorageSelection {
    match config.backend {
        StorageBackend::Memory => {
            tracing::debug!("using in-memory point storage");
            StorageSelection {
                adapter: Arc::new(MemoryStorage::new()),
                fallback: false,
                fallback_reason: None,
            }
        }
        StorageBackend::Sqlite => match SqliteStorage::open(&config.db_path) {
            Ok(storage) => {
                tracing::debug!(path = %config.db_path.display(), "using sqlite point storage");
                StorageSelection {
                    adapter: Arc::new(storage),
                    fallback: false,
                    fallback_reason: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    path = %config.db_path.display(),
                    %err,
                    "sqlite storage unavailable, falling back to memory"
                );
                StorageSelection {
                    adapter: Arc::new(MemoryStorage::new()),
                    fallback: true,
                    fallback_reason: Some(err.to_string()),
                }
            }
        },
    }
}
