use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted metric value for a window size at a cycle timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub metric: String,
    pub window_days: u32,
    pub ts: DateTime<Utc>,
    pub value: serde_json::Value,
}

impl MetricPoint {
    pub fn new(
        metric: impl Into<String>,
        window_days: u32,
        ts: DateTime<Utc>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            metric: metric.into(),
            window_days,
            ts,
            value,
        }
    }
}

/// Bookkeeping row written with each cycle's points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub ts: DateTime<Utc>,
    pub source_path: String,
    pub visits_read: u64,
    pub windows: Vec<u32>,
}
