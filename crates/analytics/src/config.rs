use chrono::{DateTime, Duration, FixedOffset, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Tunable thresholds for segmentation and aggregation.
///
/// Field names double as the keys of the `[analytics]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Inactivity gap that closes a session.
    pub gap_minutes: u32,
    /// Cap on the dwell attributed to one visit.
    pub max_dwell_minutes: u32,
    /// Dwell given to the last visit of a session.
    pub min_dwell_minutes: u32,
    pub top_n: usize,
    pub max_chain_len: usize,
    /// Sessions a path must recur in to count as a chain.
    pub min_chain_count: u64,
    pub interest_threshold_pct: f64,
    pub interest_min_recent: u64,
    pub max_sessions: usize,
    /// Offset used for hour-of-day bucketing, in minutes east of UTC.
    /// Unset means the machine's local time zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            gap_minutes: 30,
            max_dwell_minutes: 30,
            min_dwell_minutes: 1,
            top_n: 10,
            max_chain_len: 6,
            min_chain_count: 2,
            interest_threshold_pct: 50.0,
            interest_min_recent: 3,
            max_sessions: 20,
            utc_offset_minutes: None,
        }
    }
}

impl AnalyticsConfig {
    pub fn segment(&self) -> SegmentConfig {
        SegmentConfig {
            gap: Duration::minutes(i64::from(self.gap_minutes.max(1))),
            max_dwell: Duration::minutes(i64::from(self.max_dwell_minutes)),
            min_dwell: Duration::minutes(i64::from(self.min_dwell_minutes)),
        }
    }

    /// Hour of day of `ts` in the configured offset, or in local time when
    /// no offset is set or it is out of range.
    pub fn hour_of_day(&self, ts: DateTime<Utc>) -> u8 {
        let fixed = self
            .utc_offset_minutes
            .and_then(|minutes| FixedOffset::east_opt(minutes.saturating_mul(60)));
        let hour = match fixed {
            Some(offset) => ts.with_timezone(&offset).hour(),
            None => ts.with_timezone(&Local).hour(),
        };
        hour as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentConfig {
    pub gap: Duration,
    pub max_dwell: Duration,
    pub min_dwell: Duration,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        AnalyticsConfig::default().segment()
    }
}
