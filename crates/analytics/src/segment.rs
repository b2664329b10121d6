use youknow_core::{CategorizedVisit, Category, Session};

use crate::config::SegmentConfig;

/// Groups time-ordered visits into sessions split at inactivity gaps.
///
/// A gap equal to or longer than `config.gap` starts a new session. Visits on
/// either side of midnight stay together as long as the gap is shorter.
pub fn segment(visits: &[CategorizedVisit], config: &SegmentConfig) -> Vec<Session> {
    let mut sessions = Vec::new();
    let Some(first) = visits.first() else {
        return sessions;
    };

    let mut current = vec![first.clone()];
    for pair in visits.windows(2) {
        let gap = pair[1].timestamp() - pair[0].timestamp();
        if gap >= config.gap {
            sessions.push(close_session(std::mem::take(&mut current), config));
        }
        current.push(pair[1].clone());
    }
    sessions.push(close_session(current, config));

    tracing::trace!(visits = visits.len(), sessions = sessions.len(), "segmented visits");
    sessions
}

fn close_session(visits: Vec<CategorizedVisit>, config: &SegmentConfig) -> Session {
    let start = visits[0].timestamp();
    let end = visits[visits.len() - 1].timestamp();
    let span = (end - start).num_minutes();
    // One visit (or a burst within the same minute) has no observable span.
    let duration_min = if span <= 0 {
        config.min_dwell.num_minutes()
    } else {
        span
    };

    Session {
        start,
        duration_min: duration_min.clamp(0, i64::from(u32::MAX)) as u32,
        dominant: dominant_category(&visits),
        path: collapsed_path(&visits),
        visits,
    }
}

/// Most frequent category; ties go to the one seen first.
pub fn dominant_category(visits: &[CategorizedVisit]) -> Category {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for visit in visits {
        match counts.iter_mut().find(|(category, _)| *category == visit.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((visit.category, 1)),
        }
    }
    let mut best: Option<(Category, usize)> = None;
    for (category, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category).unwrap_or(Category::Other)
}

pub fn collapsed_path(visits: &[CategorizedVisit]) -> Vec<String> {
    let mut path: Vec<String> = Vec::new();
    for visit in visits {
        if path.last() != Some(&visit.domain) {
            path.push(visit.domain.clone());
        }
    }
    path
}
