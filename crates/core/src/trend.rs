use crate::{FocusMetrics, TrendMetrics};

/// Reported instead of an undefined percentage when activity starts from zero.
pub const NEW_ACTIVITY_DELTA_PCT: f64 = 999.0;

pub fn delta_pct(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return if current == 0 {
            0.0
        } else {
            NEW_ACTIVITY_DELTA_PCT
        };
    }
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    (change * 10.0).round() / 10.0
}

pub fn trend(
    current: &FocusMetrics,
    previous: &FocusMetrics,
    current_search_count: u64,
    previous_search_count: u64,
) -> TrendMetrics {
    TrendMetrics {
        docs_min_delta_pct: delta_pct(current.docs_min, previous.docs_min),
        social_min_delta_pct: delta_pct(current.social_min, previous.social_min),
        search_count_delta_pct: delta_pct(current_search_count, previous_search_count),
    }
}
