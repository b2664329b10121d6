use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use youknow_core::{CategorizedVisit, Session, TimeRange};

use crate::aggregate::{Aggregates, aggregate};
use crate::config::AnalyticsConfig;
use crate::segment::segment;

/// Half-open range `[start, end)` of `days` length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub days: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            days,
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }

    /// The window of equal length immediately before this one.
    pub fn previous(&self) -> Self {
        Self::ending_at(self.start, self.days)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Start of the final third, used as the recent/baseline split.
    pub fn recent_boundary(&self) -> DateTime<Utc> {
        self.start + (self.end - self.start) * 2 / 3
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            start: self.start.to_rfc3339(),
            end: self.end.to_rfc3339(),
        }
    }
}

/// Visits inside `window`, keeping their order.
pub fn visits_in(visits: &[CategorizedVisit], window: &Window) -> Vec<CategorizedVisit> {
    let first = visits.partition_point(|visit| visit.timestamp() < window.start);
    let last = visits.partition_point(|visit| visit.timestamp() < window.end);
    visits[first..last.max(first)].to_vec()
}

/// Segments and aggregates the visits that fall inside `window`.
pub fn analyze_window(
    visits: &[CategorizedVisit],
    window: &Window,
    config: &AnalyticsConfig,
) -> (Vec<Session>, Aggregates) {
    let in_window = visits_in(visits, window);
    let sessions = segment(&in_window, &config.segment());
    let aggregates = aggregate(&sessions, window, config);
    (sessions, aggregates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use youknow_core::Visit;

    #[test]
    fn previous_window_is_adjacent() {
        let end = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let window = Window::ending_at(end, 7);
        let previous = window.previous();
        assert_eq!(previous.end, window.start);
        assert_eq!(previous.start, end - Duration::days(14));
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn recent_boundary_splits_final_third() {
        let end = Utc.with_ymd_and_hms(2024, 5, 4, 0, 0, 0).unwrap();
        let window = Window::ending_at(end, 3);
        assert_eq!(window.recent_boundary(), end - Duration::days(1));
    }

    #[test]
    fn visits_in_uses_sorted_bounds() {
        let end = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
        let window = Window::ending_at(end, 1);
        let visits: Vec<_> = [-30, -20, -2, 0, 1]
            .into_iter()
            .map(|hours| {
                CategorizedVisit::from_visit(Visit {
                    url: "https://example.com/".to_string(),
                    title: String::new(),
                    timestamp: end + Duration::hours(hours),
                    visit_count: 1,
                })
            })
            .collect();
        let inside = visits_in(&visits, &window);
        assert_eq!(inside.len(), 2);
        assert_eq!(inside[1].timestamp(), end - Duration::hours(2));
    }
}
