use youknow_core::{CategorizedVisit, Session};

use crate::config::SegmentConfig;

/// Estimated seconds spent on each visit of a session.
///
/// Browser history records visit events, not durations. A visit is credited
/// with the gap to the next visit, capped at `max_dwell`; the last visit of a
/// session gets `min_dwell`.
pub fn visit_dwell<'a>(
    session: &'a Session,
    config: &SegmentConfig,
) -> impl Iterator<Item = (&'a CategorizedVisit, i64)> + 'a {
    let max = config.max_dwell.num_seconds().max(0);
    let min = config.min_dwell.num_seconds().max(0);
    let visits = &session.visits;
    visits.iter().enumerate().map(move |(idx, visit)| {
        let seconds = match visits.get(idx + 1) {
            Some(next) => (next.timestamp() - visit.timestamp()).num_seconds().clamp(0, max),
            None => min,
        };
        (visit, seconds)
    })
}

/// Whole minutes, rounding half up.
pub fn seconds_to_minutes(seconds: i64) -> u64 {
    (seconds.max(0) as u64 + 30) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;
    use chrono::{Duration, TimeZone, Utc};
    use youknow_core::Visit;

    fn visit(url: &str, minute: i64) -> CategorizedVisit {
        let base = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
        CategorizedVisit::from_visit(Visit {
            url: url.to_string(),
            title: String::new(),
            timestamp: base + Duration::minutes(minute),
            visit_count: 1,
        })
    }

    #[test]
    fn gaps_are_capped_and_last_visit_gets_minimum() {
        let config = SegmentConfig {
            gap: Duration::minutes(60),
            max_dwell: Duration::minutes(10),
            min_dwell: Duration::minutes(1),
        };
        let visits = vec![
            visit("https://github.com/", 0),
            visit("https://docs.rs/", 25),
            visit("https://github.com/", 30),
        ];
        let sessions = segment(&visits, &config);
        let dwell: Vec<i64> = visit_dwell(&sessions[0], &config)
            .map(|(_, seconds)| seconds)
            .collect();
        assert_eq!(dwell, vec![600, 300, 60]);
    }

    #[test]
    fn rounds_half_minutes_up() {
        assert_eq!(seconds_to_minutes(29), 0);
        assert_eq!(seconds_to_minutes(30), 1);
        assert_eq!(seconds_to_minutes(150), 3);
        assert_eq!(seconds_to_minutes(-5), 0);
    }
}
