use std::collections::BTreeMap;

use analytics::Aggregates;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use youknow_core::{Dashboard, Interest};
use youknow_db::MetricPoint;

pub const METRIC_TOP_DOMAINS: &str = "top_domains";
pub const METRIC_TOP_SEARCHES: &str = "top_searches";
pub const METRIC_FOCUS: &str = "focus";
pub const METRIC_GOLDEN_HOURS: &str = "golden_hours";
pub const METRIC_SESSIONS: &str = "sessions";
pub const METRIC_TRENDS: &str = "trends";
pub const METRIC_CHAINS: &str = "chains";
pub const METRIC_INTERESTS: &str = "interests";
pub const METRIC_SEARCH_COUNT: &str = "search_count";
pub const METRIC_CATEGORY_MINUTES: &str = "category_minutes";
pub const METRIC_VISIT_COUNT: &str = "visit_count";

/// Encodes one window's results as points stamped with the cycle time.
pub(crate) fn stage_points(
    ts: DateTime<Utc>,
    dashboard: &Dashboard,
    aggregates: &Aggregates,
) -> serde_json::Result<Vec<MetricPoint>> {
    let days = dashboard.window_days;
    let point = |metric: &str, value: serde_json::Value| MetricPoint::new(metric, days, ts, value);
    Ok(vec![
        point(METRIC_TOP_DOMAINS, serde_json::to_value(&dashboard.top_domains)?),
        point(METRIC_TOP_SEARCHES, serde_json::to_value(&dashboard.top_searches)?),
        point(METRIC_FOCUS, serde_json::to_value(dashboard.focus)?),
        point(METRIC_GOLDEN_HOURS, serde_json::to_value(&dashboard.golden_hours)?),
        point(METRIC_SESSIONS, serde_json::to_value(&dashboard.sessions)?),
        point(METRIC_TRENDS, serde_json::to_value(dashboard.trends)?),
        point(METRIC_CHAINS, serde_json::to_value(&dashboard.chains)?),
        point(METRIC_INTERESTS, serde_json::to_value(&aggregates.interests)?),
        point(METRIC_SEARCH_COUNT, serde_json::to_value(aggregates.search_total)?),
        point(
            METRIC_CATEGORY_MINUTES,
            serde_json::to_value(&aggregates.category_minutes)?,
        ),
        point(METRIC_VISIT_COUNT, serde_json::to_value(aggregates.visit_count)?),
    ])
}

/// Rebuilds per-window dashboards from the points of a single cycle.
///
/// Points that no longer decode are skipped; the rest of the dashboard still loads.
pub(crate) fn restore_dashboards(
    ts: DateTime<Utc>,
    points: Vec<MetricPoint>,
) -> BTreeMap<u32, Dashboard> {
    let mut dashboards: BTreeMap<u32, Dashboard> = BTreeMap::new();
    for point in points {
        let dashboard = dashboards.entry(point.window_days).or_insert_with(|| Dashboard {
            generated_at: Some(ts),
            ..Dashboard::empty(point.window_days)
        });
        let applied = match point.metric.as_str() {
            METRIC_TOP_DOMAINS => decode_into(point.value, &mut dashboard.top_domains),
            METRIC_TOP_SEARCHES => decode_into(point.value, &mut dashboard.top_searches),
            METRIC_FOCUS => decode_into(point.value, &mut dashboard.focus),
            METRIC_GOLDEN_HOURS => decode_into(point.value, &mut dashboard.golden_hours),
            METRIC_SESSIONS => decode_into(point.value, &mut dashboard.sessions),
            METRIC_TRENDS => decode_into(point.value, &mut dashboard.trends),
            METRIC_CHAINS => decode_into(point.value, &mut dashboard.chains),
            METRIC_INTERESTS => serde_json::from_value::<Vec<Interest>>(point.value).map(
                |interests| {
                    dashboard.interests =
                        interests.into_iter().map(|interest| interest.term).collect();
                },
            ),
            _ => Ok(()),
        };
        if let Err(err) = applied {
            tracing::warn!(metric = %point.metric, window_days = point.window_days, %err, "skipping undecodable point");
        }
    }
    dashboards
}

fn decode_into<T: DeserializeOwned>(value: serde_json::Value, slot: &mut T) -> serde_json::Result<()> {
    *slot = serde_json::from_value(value)?;
    Ok(())
}

/// Value of the point stamped closest to `anchor`, if it decodes.
pub(crate) fn nearest_value<T: DeserializeOwned>(
    points: &[MetricPoint],
    anchor: DateTime<Utc>,
) -> Option<T> {
    let point = points
        .iter()
        .min_by_key(|point| (point.ts - anchor).num_milliseconds().abs())?;
    serde_json::from_value(point.value.clone()).ok()
}
