use std::collections::BTreeMap;
use std::sync::Arc;

use analytics::{Aggregates, AnalyticsConfig, Window, analyze_window};
use chrono::{DateTime, Utc};
use youknow_core::{CategorizedVisit, Dashboard, TrendMetrics, trend};

/// One fully computed cycle, swapped in as a whole.
#[derive(Debug, Clone, Default)]
pub struct Published {
    pub generated_at: Option<DateTime<Utc>>,
    pub dashboards: BTreeMap<u32, Dashboard>,
    /// Categorized visits of the cycle, kept for windows that were not precomputed.
    pub visits: Arc<Vec<CategorizedVisit>>,
    pub degraded: bool,
    /// Loaded from storage at startup rather than computed by a cycle.
    pub restored: bool,
}

pub(crate) fn build_dashboard(
    window: &Window,
    aggregates: &Aggregates,
    trends: TrendMetrics,
    generated_at: DateTime<Utc>,
) -> Dashboard {
    Dashboard {
        window_days: window.days,
        generated_at: Some(generated_at),
        degraded: false,
        top_domains: aggregates.top_domains.clone(),
        top_searches: aggregates.top_searches.clone(),
        focus: aggregates.focus,
        golden_hours: aggregates.golden_hours.clone(),
        sessions: aggregates.sessions.clone(),
        trends,
        chains: aggregates.chains.clone(),
        interests: aggregates
            .interests
            .iter()
            .map(|interest| interest.term.clone())
            .collect(),
    }
}

pub(crate) fn dashboard_for(published: &Published, days: u32, config: &AnalyticsConfig) -> Dashboard {
    let Some(generated_at) = published.generated_at else {
        return Dashboard::empty(days);
    };
    if let Some(dashboard) = published.dashboards.get(&days) {
        return dashboard.clone();
    }

    let window = Window::ending_at(generated_at, days);
    let (_, current) = analyze_window(&published.visits, &window, config);
    let (_, previous) = analyze_window(&published.visits, &window.previous(), config);
    let trends = trend(
        &current.focus,
        &previous.focus,
        current.search_total,
        previous.search_total,
    );
    let mut dashboard = build_dashboard(&window, &current, trends, generated_at);
    dashboard.degraded = published.degraded;
    dashboard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_is_empty_not_an_error() {
        let dashboard = dashboard_for(&Published::default(), 7, &AnalyticsConfig::default());
        assert_eq!(dashboard, Dashboard::empty(7));
        assert!(dashboard.generated_at.is_none());
    }
}
