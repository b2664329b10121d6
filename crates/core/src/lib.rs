use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod categorize;
mod trend;
mod web;

pub use categorize::{CATEGORY_TABLE, DomainPattern, categorize, categorize_url};
pub use trend::{NEW_ACTIVITY_DELTA_PCT, delta_pct, trend};
pub use web::{SEARCH_ENGINES, SearchEngine, domain_of, search_query};

/// A single page visit read from the browser history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub url: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub visit_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Social,
    Development,
    Documentation,
    Search,
    News,
    Shopping,
    Entertainment,
    Email,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Social,
        Category::Development,
        Category::Documentation,
        Category::Search,
        Category::News,
        Category::Shopping,
        Category::Entertainment,
        Category::Email,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Development => "development",
            Self::Documentation => "documentation",
            Self::Search => "search",
            Self::News => "news",
            Self::Shopping => "shopping",
            Self::Entertainment => "entertainment",
            Self::Email => "email",
            Self::Other => "other",
        }
    }

    /// Categories counted as productive time in the focus score.
    pub fn is_focus(&self) -> bool {
        matches!(self, Self::Development | Self::Documentation)
    }

    pub fn is_distraction(&self) -> bool {
        matches!(self, Self::Social)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedVisit {
    pub visit: Visit,
    pub domain: String,
    pub category: Category,
}

impl CategorizedVisit {
    pub fn from_visit(visit: Visit) -> Self {
        let domain = domain_of(&visit.url);
        let category = categorize(&domain);
        Self {
            visit,
            domain,
            category,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.visit.timestamp
    }
}

/// A contiguous run of browsing separated from its neighbours by an inactivity gap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub start: DateTime<Utc>,
    pub duration_min: u32,
    pub dominant: Category,
    pub path: Vec<String>,
    #[serde(skip)]
    pub visits: Vec<CategorizedVisit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainStat {
    pub domain: String,
    pub minutes: u64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStat {
    #[serde(rename = "q")]
    pub query: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusMetrics {
    pub docs_min: u64,
    pub social_min: u64,
    pub score: f64,
}

impl FocusMetrics {
    pub fn new(docs_min: u64, social_min: u64) -> Self {
        let total = docs_min + social_min;
        let score = if total == 0 {
            0.0
        } else {
            let ratio = (docs_min as f64 / total as f64).clamp(0.0, 1.0);
            (ratio * 100.0).round() / 100.0
        };
        Self {
            docs_min,
            social_min,
            score,
        }
    }
}

/// Hour of day (0-23) to minutes; hours without activity are absent.
pub type GoldenHours = BTreeMap<u8, u64>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain(pub Vec<String>);

impl Chain {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `other` appears as a contiguous run inside this chain.
    pub fn contains(&self, other: &Chain) -> bool {
        if other.0.is_empty() || other.0.len() > self.0.len() {
            return other.0.is_empty();
        }
        self.0.windows(other.0.len()).any(|window| window == other.0.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub term: String,
    pub recent_count: u64,
    pub baseline_count: u64,
    pub increase_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendMetrics {
    pub docs_min_delta_pct: f64,
    pub social_min_delta_pct: f64,
    pub search_count_delta_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Read model served to the presentation layer for one window size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub window_days: u32,
    pub generated_at: Option<DateTime<Utc>>,
    pub degraded: bool,
    pub top_domains: Vec<DomainStat>,
    pub top_searches: Vec<SearchStat>,
    pub focus: FocusMetrics,
    pub golden_hours: GoldenHours,
    pub sessions: Vec<Session>,
    pub trends: TrendMetrics,
    pub chains: Vec<Chain>,
    pub interests: Vec<String>,
}

impl Dashboard {
    /// The "no data yet" result returned before the first successful cycle.
    pub fn empty(window_days: u32) -> Self {
        Self {
            window_days,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_score_is_zero_without_activity() {
        let focus = FocusMetrics::new(0, 0);
        assert_eq!(focus.score, 0.0);
    }

    #[test]
    fn focus_score_rounds_to_two_decimals() {
        let focus = FocusMetrics::new(2, 1);
        assert_eq!(focus.score, 0.67);
        assert_eq!(FocusMetrics::new(5, 0).score, 1.0);
        assert_eq!(FocusMetrics::new(0, 9).score, 0.0);
    }

    #[test]
    fn chain_contains_contiguous_runs_only() {
        let chain = Chain(vec!["a".into(), "b".into(), "c".into()]);
        assert!(chain.contains(&Chain(vec!["b".into(), "c".into()])));
        assert!(!chain.contains(&Chain(vec!["a".into(), "c".into()])));
        assert!(!chain.contains(&Chain(vec![
            "a".into(),
            "b".into(),
            "c".into(),
            "d".into()
        ])));
    }

    #[test]
    fn dashboard_serializes_expected_keys() {
        let mut dashboard = Dashboard::empty(7);
        dashboard.golden_hours.insert(9, 15);
        dashboard.top_searches.push(SearchStat {
            query: "rust traits".to_string(),
            count: 2,
        });
        let value = serde_json::to_value(&dashboard).expect("serialize");
        assert_eq!(value["golden_hours"]["9"], 15);
        assert_eq!(value["top_searches"][0]["q"], "rust traits");
        assert!(value["generated_at"].is_null());
        for key in [
            "top_domains",
            "focus",
            "sessions",
            "trends",
            "chains",
            "interests",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
