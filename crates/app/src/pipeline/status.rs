use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Ingesting,
    Aggregating,
    Persisting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(err: &AppError, at: DateTime<Utc>) -> Self {
        Self {
            kind: ErrorKind::of(err),
            message: err.to_string(),
            at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCounters {
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub degraded: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub name: &'static str,
    pub durable: bool,
    pub healthy: bool,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Snapshot returned by the status query.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub running: bool,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<ErrorRecord>,
    pub backend: BackendStatus,
    pub degraded: bool,
    pub last_visits_read: u64,
    pub counters: CycleCounters,
}

/// Mutable bookkeeping behind [`PipelineStatus`].
#[derive(Debug, Clone, Default)]
pub(crate) struct StatusRecord {
    pub state: PipelineState,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error: Option<ErrorRecord>,
    pub storage_degraded: bool,
    pub last_visits_read: u64,
    pub counters: CycleCounters,
}
