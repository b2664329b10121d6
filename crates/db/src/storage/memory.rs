use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use youknow_core::TimeRange;

use super::{StorageAdapter, StorageError, StorageResult};
use crate::points::parse_ts;
use crate::types::{CycleRecord, MetricPoint};

#[derive(Debug, Default)]
struct Inner {
    cycles: Vec<CycleRecord>,
    points: Vec<MetricPoint>,
}

/// Process-local storage used when no durable backend is configured or reachable.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::BackendUnreachable("memory storage poisoned".to_string()))
    }
}

impl StorageAdapter for MemoryStorage {
    fn write(&self, cycle: &CycleRecord, points: &[MetricPoint]) -> StorageResult<usize> {
        let mut inner = self.lock()?;
        inner.cycles.retain(|existing| existing.ts != cycle.ts);
        inner.cycles.push(cycle.clone());
        for point in points {
            inner.points.retain(|existing| {
                !(existing.metric == point.metric
                    && existing.window_days == point.window_days
                    && existing.ts == point.ts)
            });
            inner.points.push(point.clone());
        }
        Ok(points.len())
    }

    fn query(
        &self,
        metric: &str,
        window_days: u32,
        range: &TimeRange,
    ) -> StorageResult<Vec<MetricPoint>> {
        let start = parse_ts(&range.start)?;
        let end = parse_ts(&range.end)?;
        let inner = self.lock()?;
        let mut points: Vec<MetricPoint> = inner
            .points
            .iter()
            .filter(|point| {
                point.metric == metric
                    && point.window_days == window_days
                    && point.ts >= start
                    && point.ts < end
            })
            .cloned()
            .collect();
        points.sort_by_key(|point| point.ts);
        Ok(points)
    }

    fn latest(&self) -> StorageResult<Option<(CycleRecord, Vec<MetricPoint>)>> {
        let inner = self.lock()?;
        let Some(cycle) = inner.cycles.iter().max_by_key(|cycle| cycle.ts) else {
            return Ok(None);
        };
        let points = inner
            .points
            .iter()
            .filter(|point| point.ts == cycle.ts)
            .cloned()
            .collect();
        Ok(Some((cycle.clone(), points)))
    }

    fn delete_before(&self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        let mut inner = self.lock()?;
        let before = inner.points.len();
        inner.points.retain(|point| point.ts >= cutoff);
        inner.cycles.retain(|cycle| cycle.ts >= cutoff);
        Ok(before - inner.points.len())
    }

    fn health_check(&self) -> StorageResult<()> {
        self.lock().map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_durable(&self) -> bool {
        false
    }
}
