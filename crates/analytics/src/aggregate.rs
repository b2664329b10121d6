use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use youknow_core::{
    Category, Chain, DomainStat, FocusMetrics, GoldenHours, Interest, NEW_ACTIVITY_DELTA_PCT,
    SearchStat, Session, search_query,
};

use crate::config::AnalyticsConfig;
use crate::dwell::{seconds_to_minutes, visit_dwell};
use crate::window::Window;

/// Everything derived from one window's sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub visit_count: u64,
    pub top_domains: Vec<DomainStat>,
    pub top_searches: Vec<SearchStat>,
    /// Search visits before truncation to `top_n`.
    pub search_total: u64,
    pub focus: FocusMetrics,
    pub golden_hours: GoldenHours,
    pub category_minutes: BTreeMap<Category, u64>,
    /// Most recent first.
    pub sessions: Vec<Session>,
    pub chains: Vec<Chain>,
    pub interests: Vec<Interest>,
}

impl Aggregates {
    pub fn is_empty(&self) -> bool {
        self.visit_count == 0
    }
}

pub fn aggregate(sessions: &[Session], window: &Window, config: &AnalyticsConfig) -> Aggregates {
    let segment = config.segment();

    let mut domain_seconds: BTreeMap<&str, (i64, Category)> = BTreeMap::new();
    let mut category_seconds: BTreeMap<Category, i64> = BTreeMap::new();
    let mut hour_seconds: BTreeMap<u8, i64> = BTreeMap::new();
    let mut searches: BTreeMap<String, u64> = BTreeMap::new();
    let mut visit_count = 0u64;

    for session in sessions {
        for (visit, seconds) in visit_dwell(session, &segment) {
            visit_count += 1;
            let entry = domain_seconds
                .entry(visit.domain.as_str())
                .or_insert((0, visit.category));
            entry.0 += seconds;
            *category_seconds.entry(visit.category).or_default() += seconds;
            let hour = config.hour_of_day(visit.timestamp());
            *hour_seconds.entry(hour).or_default() += seconds;
            if let Some(query) = search_query(&visit.visit.url) {
                *searches.entry(query).or_default() += 1;
            }
        }
    }

    let mut top_domains: Vec<DomainStat> = domain_seconds
        .into_iter()
        .map(|(domain, (seconds, category))| DomainStat {
            domain: domain.to_string(),
            minutes: seconds_to_minutes(seconds),
            category,
        })
        .collect();
    top_domains.sort_by(|a, b| b.minutes.cmp(&a.minutes).then_with(|| a.domain.cmp(&b.domain)));
    top_domains.truncate(config.top_n);

    let search_total = searches.values().sum();
    let mut top_searches: Vec<SearchStat> = searches
        .into_iter()
        .map(|(query, count)| SearchStat { query, count })
        .collect();
    top_searches.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.query.cmp(&b.query)));
    top_searches.truncate(config.top_n);

    let focus_seconds: i64 = category_seconds
        .iter()
        .filter(|(category, _)| category.is_focus())
        .map(|(_, seconds)| seconds)
        .sum();
    let social_seconds: i64 = category_seconds
        .iter()
        .filter(|(category, _)| category.is_distraction())
        .map(|(_, seconds)| seconds)
        .sum();
    let focus = FocusMetrics::new(
        seconds_to_minutes(focus_seconds),
        seconds_to_minutes(social_seconds),
    );

    let golden_hours = hour_seconds
        .into_iter()
        .map(|(hour, seconds)| (hour, seconds_to_minutes(seconds)))
        .filter(|(_, minutes)| *minutes > 0)
        .collect();
    let category_minutes = category_seconds
        .into_iter()
        .map(|(category, seconds)| (category, seconds_to_minutes(seconds)))
        .collect();

    let mut recent_sessions: Vec<Session> = sessions
        .iter()
        .map(|session| Session {
            start: session.start,
            duration_min: session.duration_min,
            dominant: session.dominant,
            path: session.path.clone(),
            visits: Vec::new(),
        })
        .collect();
    recent_sessions.sort_by(|a, b| b.start.cmp(&a.start));
    recent_sessions.truncate(config.max_sessions);

    Aggregates {
        visit_count,
        top_domains,
        top_searches,
        search_total,
        focus,
        golden_hours,
        category_minutes,
        sessions: recent_sessions,
        chains: chains(sessions, config),
        interests: interests(sessions, window, config),
    }
}

/// Recurring session paths, longest distinct ones first among equal counts.
///
/// Each distinct contiguous sub-path of length two or more is counted once
/// per session. Chains contained in a higher-ranked chain are dropped.
pub fn chains(sessions: &[Session], config: &AnalyticsConfig) -> Vec<Chain> {
    let max_len = config.max_chain_len.max(2);
    let mut counts: BTreeMap<&[String], u64> = BTreeMap::new();
    for session in sessions {
        let mut seen: BTreeSet<&[String]> = BTreeSet::new();
        for len in 2..=max_len.min(session.path.len()) {
            for run in session.path.windows(len) {
                seen.insert(run);
            }
        }
        for run in seen {
            *counts.entry(run).or_default() += 1;
        }
    }

    let mut ranked: Vec<(&[String], u64)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= config.min_chain_count.max(1))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.0.len().cmp(&a.0.len()))
            .then_with(|| a.0.cmp(b.0))
    });

    let mut selected: Vec<Chain> = Vec::new();
    for (run, _) in ranked {
        if selected.len() >= config.top_n {
            break;
        }
        let candidate = Chain(run.to_vec());
        if selected.iter().any(|chain| chain.contains(&candidate)) {
            continue;
        }
        selected.push(candidate);
    }
    selected
}

/// Terms whose visit rate in the final third of the window rose against the
/// first two thirds.
pub fn interests(sessions: &[Session], window: &Window, config: &AnalyticsConfig) -> Vec<Interest> {
    let boundary = window.recent_boundary();
    let recent_span = (window.end - boundary).num_seconds();
    let baseline_span = (boundary - window.start).num_seconds();
    if recent_span <= 0 || baseline_span <= 0 {
        return Vec::new();
    }

    let mut counts: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for visit in sessions.iter().flat_map(|session| session.visits.iter()) {
        let recent = visit.timestamp() >= boundary;
        let mut terms = vec![visit.domain.clone()];
        if let Some(query) = search_query(&visit.visit.url) {
            terms.extend(query_terms(&query));
        }
        for term in terms {
            let entry = counts.entry(term).or_default();
            if recent {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }

    let mut rising: Vec<Interest> = counts
        .into_iter()
        .filter(|(_, (recent, _))| *recent >= config.interest_min_recent)
        .map(|(term, (recent, baseline))| {
            let increase_pct = if baseline == 0 {
                NEW_ACTIVITY_DELTA_PCT
            } else {
                let recent_rate = recent as f64 / recent_span as f64;
                let baseline_rate = baseline as f64 / baseline_span as f64;
                ((recent_rate / baseline_rate - 1.0) * 100.0 * 10.0).round() / 10.0
            };
            Interest {
                term,
                recent_count: recent,
                baseline_count: baseline,
                increase_pct,
            }
        })
        .filter(|interest| interest.increase_pct >= config.interest_threshold_pct)
        .collect();
    rising.sort_by(|a, b| {
        b.increase_pct
            .total_cmp(&a.increase_pct)
            .then_with(|| b.recent_count.cmp(&a.recent_count))
            .then_with(|| a.term.cmp(&b.term))
    });
    rising.truncate(config.top_n);
    rising
}

const STOP_WORDS: &[&str] = &[
    "and", "are", "can", "for", "from", "how", "the", "what", "when", "where", "why", "with",
];

/// Lower-cased search words of three or more characters, minus stop words.
fn query_terms(query: &str) -> BTreeSet<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}
