use analytics::AnalyticsConfig;
use serde::{Deserialize, Serialize};
use youknow_db::StorageBackend;

/// Longest window a cycle computes; larger configured values are clamped.
pub const MAX_WINDOW_DAYS: u32 = 365;
pub const MAX_RETENTION_DAYS: u32 = 3650;
const MAX_INTERVAL_SECS: u64 = 86_400;

/// Scheduling, retention and window settings for the pipeline.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub interval_secs: u64,
    pub retention_days: u32,
    pub windows_days: Vec<u32>,
    pub storage: StorageBackend,
    pub refresh_debounce_secs: u64,
    pub analytics: AnalyticsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            retention_days: 30,
            windows_days: vec![1, 7, 30],
            storage: StorageBackend::Sqlite,
            refresh_debounce_secs: 10,
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Configured windows, sorted, deduplicated, zero removed, clamped to
    /// [`MAX_WINDOW_DAYS`]; `[7]` if none remain.
    pub fn windows(&self) -> Vec<u32> {
        let mut windows: Vec<u32> = self
            .windows_days
            .iter()
            .copied()
            .filter(|days| *days > 0)
            .map(|days| days.min(MAX_WINDOW_DAYS))
            .collect();
        windows.sort_unstable();
        windows.dedup();
        if windows.is_empty() {
            windows.push(7);
        }
        windows
    }

    /// Largest window, also the largest `days` a dashboard may be asked for.
    pub fn max_window_days(&self) -> u32 {
        self.windows().last().copied().unwrap_or(7)
    }

    /// Days of history read per cycle: enough for the largest window and the one before it.
    pub fn lookback_days(&self) -> u32 {
        self.max_window_days() * 2
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days.clamp(1, MAX_RETENTION_DAYS)
    }

    /// Time between scheduled cycles, between one second and one day.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs.clamp(1, MAX_INTERVAL_SECS))
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DashboardParams {
    pub days: Option<i64>,
}
