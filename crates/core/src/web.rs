use url::Url;

use crate::categorize::DomainPattern;

/// A search engine whose result pages carry the query in a URL parameter.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine {
    pub host: DomainPattern,
    pub path_prefix: Option<&'static str>,
    pub param: &'static str,
}

pub const SEARCH_ENGINES: &[SearchEngine] = &[
    SearchEngine {
        host: DomainPattern::Suffix("google.com"),
        path_prefix: Some("/search"),
        param: "q",
    },
    SearchEngine {
        host: DomainPattern::Suffix("bing.com"),
        path_prefix: Some("/search"),
        param: "q",
    },
    SearchEngine {
        host: DomainPattern::Suffix("duckduckgo.com"),
        path_prefix: None,
        param: "q",
    },
    SearchEngine {
        host: DomainPattern::Suffix("search.yahoo.com"),
        path_prefix: Some("/search"),
        param: "p",
    },
    SearchEngine {
        host: DomainPattern::Suffix("ecosia.org"),
        path_prefix: Some("/search"),
        param: "q",
    },
    SearchEngine {
        host: DomainPattern::Suffix("search.brave.com"),
        path_prefix: Some("/search"),
        param: "q",
    },
];

/// Normalized host of a URL: lower-case, no `www.` prefix, no port.
pub fn domain_of(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return "unknown".to_string();
    };
    match parsed.host_str() {
        Some(host) if !host.is_empty() => {
            let host = host.to_ascii_lowercase();
            match host.strip_prefix("www.") {
                Some(rest) if !rest.is_empty() => rest.to_string(),
                _ => host,
            }
        }
        _ => "unknown".to_string(),
    }
}

/// Search text of a known search-engine results URL, percent-decoded.
pub fn search_query(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let engine = SEARCH_ENGINES.iter().find(|engine| {
        engine.host.matches(host)
            && engine
                .path_prefix
                .is_none_or(|prefix| parsed.path().starts_with(prefix))
    })?;
    let (_, value) = parsed
        .query_pairs()
        .find(|(key, _)| key.as_ref() == engine.param)?;
    let query = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if query.is_empty() { None } else { Some(query) }
}
