use crate::{Category, domain_of};

/// How a table entry matches a normalized domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainPattern {
    /// The domain itself or any subdomain of it.
    Suffix(&'static str),
    /// Domains starting with the given label, e.g. `docs.`.
    Prefix(&'static str),
    Contains(&'static str),
}

impl DomainPattern {
    pub fn matches(&self, domain: &str) -> bool {
        match self {
            Self::Suffix(suffix) => {
                domain == *suffix
                    || (domain.ends_with(suffix)
                        && domain[..domain.len() - suffix.len()].ends_with('.'))
            }
            Self::Prefix(prefix) => domain.starts_with(prefix),
            Self::Contains(needle) => domain.contains(needle),
        }
    }
}

/// Ordered category table; the first matching entry wins.
pub const CATEGORY_TABLE: &[(DomainPattern, Category)] = &[
    (DomainPattern::Suffix("facebook.com"), Category::Social),
    (DomainPattern::Suffix("twitter.com"), Category::Social),
    (DomainPattern::Suffix("x.com"), Category::Social),
    (DomainPattern::Suffix("instagram.com"), Category::Social),
    (DomainPattern::Suffix("reddit.com"), Category::Social),
    (DomainPattern::Suffix("tiktok.com"), Category::Social),
    (DomainPattern::Suffix("linkedin.com"), Category::Social),
    (DomainPattern::Suffix("mastodon.social"), Category::Social),
    (DomainPattern::Suffix("github.com"), Category::Development),
    (DomainPattern::Suffix("gitlab.com"), Category::Development),
    (DomainPattern::Suffix("bitbucket.org"), Category::Development),
    (DomainPattern::Suffix("stackoverflow.com"), Category::Development),
    (DomainPattern::Suffix("stackexchange.com"), Category::Development),
    (DomainPattern::Suffix("crates.io"), Category::Development),
    (DomainPattern::Suffix("npmjs.com"), Category::Development),
    (DomainPattern::Suffix("pypi.org"), Category::Development),
    (DomainPattern::Prefix("docs."), Category::Documentation),
    (DomainPattern::Prefix("api."), Category::Documentation),
    (DomainPattern::Prefix("developer."), Category::Documentation),
    (DomainPattern::Suffix("docs.rs"), Category::Documentation),
    (DomainPattern::Suffix("readthedocs.io"), Category::Documentation),
    (DomainPattern::Suffix("devdocs.io"), Category::Documentation),
    (DomainPattern::Contains("documentation"), Category::Documentation),
    (DomainPattern::Suffix("wikipedia.org"), Category::Documentation),
    (DomainPattern::Suffix("mail.google.com"), Category::Email),
    (DomainPattern::Suffix("gmail.com"), Category::Email),
    (DomainPattern::Suffix("outlook.com"), Category::Email),
    (DomainPattern::Suffix("outlook.live.com"), Category::Email),
    (DomainPattern::Suffix("mail.yahoo.com"), Category::Email),
    (DomainPattern::Suffix("proton.me"), Category::Email),
    (DomainPattern::Suffix("google.com"), Category::Search),
    (DomainPattern::Suffix("bing.com"), Category::Search),
    (DomainPattern::Suffix("duckduckgo.com"), Category::Search),
    (DomainPattern::Suffix("search.yahoo.com"), Category::Search),
    (DomainPattern::Suffix("ecosia.org"), Category::Search),
    (DomainPattern::Suffix("search.brave.com"), Category::Search),
    (DomainPattern::Prefix("news."), Category::News),
    (DomainPattern::Suffix("bbc.com"), Category::News),
    (DomainPattern::Suffix("bbc.co.uk"), Category::News),
    (DomainPattern::Suffix("cnn.com"), Category::News),
    (DomainPattern::Suffix("reuters.com"), Category::News),
    (DomainPattern::Suffix("nytimes.com"), Category::News),
    (DomainPattern::Suffix("theguardian.com"), Category::News),
    (DomainPattern::Suffix("amazon.com"), Category::Shopping),
    (DomainPattern::Suffix("ebay.com"), Category::Shopping),
    (DomainPattern::Suffix("etsy.com"), Category::Shopping),
    (DomainPattern::Prefix("shop."), Category::Shopping),
    (DomainPattern::Prefix("store."), Category::Shopping),
    (DomainPattern::Suffix("youtube.com"), Category::Entertainment),
    (DomainPattern::Suffix("netflix.com"), Category::Entertainment),
    (DomainPattern::Suffix("spotify.com"), Category::Entertainment),
    (DomainPattern::Suffix("twitch.tv"), Category::Entertainment),
];

pub fn categorize(domain: &str) -> Category {
    let domain = domain.trim().to_ascii_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain);
    CATEGORY_TABLE
        .iter()
        .find(|(pattern, _)| pattern.matches(domain))
        .map(|(_, category)| *category)
        .unwrap_or(Category::Other)
}

pub fn categorize_url(url: &str) -> Category {
    categorize(&domain_of(url))
}
