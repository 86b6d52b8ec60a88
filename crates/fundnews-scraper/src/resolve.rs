//! Canonical / AMP variant selection.
//!
//! Many publishers serve a thin landing page whose `<link rel="amphtml">` or
//! `<link rel="canonical">` points at a fuller copy of the article. The
//! alternative replaces the original only when it is substantially larger.

use reqwest::Url;
use scraper::{Html, Selector};

use crate::fetch::HttpFetcher;

// 60 %
const MIN_ALT_RATIO_NUM: usize = 3;
const MIN_ALT_RATIO_DEN: usize = 5;
pub const MIN_ALT_BYTES: usize = 4_000;

/// The page chosen for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    pub url: String,
    pub html: Option<String>,
    pub http_status: Option<u16>,
    pub error: Option<String>,
}

/// Fetch `url`, then try its AMP or canonical variant.
///
/// The original page is kept if the alternative fails to fetch or is not
/// larger than 60 % of the original and at least 4000 bytes.
pub async fn resolve_page(fetcher: &HttpFetcher, url: &str) -> ResolvedPage {
    let first = fetcher.fetch(url).await;
    let Some(html) = first.body else {
        return ResolvedPage {
            url: url.to_owned(),
            html: None,
            http_status: first.status,
            error: first.error,
        };
    };

    let (canonical, amp) = find_alternates(&html, url);
    if let Some(candidate) = choose_alternate(url, canonical.as_deref(), amp.as_deref()) {
        let alt = fetcher.fetch(&candidate).await;
        match alt.body {
            Some(alt_html) if should_adopt(html.len(), alt_html.len()) => {
                tracing::debug!(
                    original = url,
                    resolved = %candidate,
                    original_len = html.len(),
                    alt_len = alt_html.len(),
                    "switched to alternate page"
                );
                return ResolvedPage {
                    url: candidate,
                    html: Some(alt_html),
                    http_status: alt.status.or(first.status),
                    error: None,
                };
            }
            Some(_) => {
                tracing::debug!(original = url, alt = %candidate, "alternate page too small");
            }
            None => {
                tracing::debug!(
                    original = url,
                    alt = %candidate,
                    error = alt.error.as_deref().unwrap_or(""),
                    "alternate fetch failed"
                );
            }
        }
    }

    ResolvedPage {
        url: url.to_owned(),
        html: Some(html),
        http_status: first.status,
        error: None,
    }
}

/// Find `(canonical, amphtml)` link targets, resolved against `base_url`.
#[must_use]
pub fn find_alternates(html: &str, base_url: &str) -> (Option<String>, Option<String>) {
    let Ok(selector) = Selector::parse("link[rel][href]") else {
        return (None, None);
    };
    let base = Url::parse(base_url).ok();
    let doc = Html::parse_document(html);

    let mut canonical = None;
    let mut amp = None;
    for link in doc.select(&selector) {
        let rel = link.value().attr("rel").unwrap_or_default().to_ascii_lowercase();
        let Some(href) = link.value().attr("href").map(str::trim).filter(|h| !h.is_empty())
        else {
            continue;
        };
        let has_rel = |name: &str| rel.split_whitespace().any(|token| token == name);
        if canonical.is_none() && has_rel("canonical") {
            canonical = absolutize(base.as_ref(), href);
        } else if amp.is_none() && has_rel("amphtml") {
            amp = absolutize(base.as_ref(), href);
        }
    }
    (canonical, amp)
}

fn absolutize(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}

/// Pick which alternative to try.
///
/// AMP wins when it is on the same host as `current` or its URL contains
/// `"amp."`; otherwise canonical is used. Returns `None` when there is no
/// candidate or the candidate is `current` itself.
#[must_use]
pub fn choose_alternate(
    current: &str,
    canonical: Option<&str>,
    amp: Option<&str>,
) -> Option<String> {
    let amp_ok = amp.filter(|a| same_host(current, a) || a.contains("amp."));
    amp_ok
        .or(canonical)
        .filter(|candidate| *candidate != current)
        .map(str::to_owned)
}

fn same_host(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.host_str().is_some() && a.host_str() == b.host_str(),
        _ => false,
    }
}

/// `alt_len > 0.6 * original_len && alt_len >= 4000`.
#[must_use]
pub fn should_adopt(original_len: usize, alt_len: usize) -> bool {
    alt_len >= MIN_ALT_BYTES
        && alt_len.saturating_mul(MIN_ALT_RATIO_DEN)
            > original_len.saturating_mul(MIN_ALT_RATIO_NUM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_relative_and_absolute_links() {
        let html = r#"<html><head>
            <link rel="canonical" href="https://news.example/story">
            <link rel="amphtml" href="/amp/story">
        </head><body></body></html>"#;
        let (canonical, amp) = find_alternates(html, "https://news.example/landing?x=1");
        assert_eq!(canonical.as_deref(), Some("https://news.example/story"));
        assert_eq!(amp.as_deref(), Some("https://news.example/amp/story"));
    }

    #[test]
    fn rel_matching_is_case_insensitive() {
        let html = r#"<link rel="Canonical" href="https://news.example/c">"#;
        let (canonical, amp) = find_alternates(html, "https://news.example/x");
        assert_eq!(canonical.as_deref(), Some("https://news.example/c"));
        assert!(amp.is_none());
    }

    #[test]
    fn no_links_means_no_alternates() {
        assert_eq!(
            find_alternates("<p>hi</p>", "https://news.example/x"),
            (None, None)
        );
    }

    #[test]
    fn same_host_amp_is_preferred_over_canonical() {
        let chosen = choose_alternate(
            "https://news.example/a",
            Some("https://news.example/canonical"),
            Some("https://news.example/a/amp"),
        );
        assert_eq!(chosen.as_deref(), Some("https://news.example/a/amp"));
    }

    #[test]
    fn amp_cdn_host_is_accepted() {
        let chosen = choose_alternate(
            "https://news.example/a",
            None,
            Some("https://amp.newscdn.example/a"),
        );
        assert_eq!(chosen.as_deref(), Some("https://amp.newscdn.example/a"));
    }

    #[test]
    fn foreign_amp_falls_back_to_canonical() {
        let chosen = choose_alternate(
            "https://news.example/a",
            Some("https://news.example/canonical"),
            Some("https://other.example/a"),
        );
        assert_eq!(chosen.as_deref(), Some("https://news.example/canonical"));
    }

    #[test]
    fn self_referencing_canonical_is_ignored() {
        assert!(choose_alternate("https://news.example/a", Some("https://news.example/a"), None)
            .is_none());
    }

    #[test]
    fn adoption_needs_both_ratio_and_floor() {
        // 12000 * 0.6 = 7200
        assert!(should_adopt(12_000, 8_000));
        assert!(!should_adopt(12_000, 7_000));
        assert!(!should_adopt(12_000, 7_200), "ratio is strict");
        // small pages never clear the 4000-byte floor
        assert!(!should_adopt(1_000, 3_999));
        assert!(should_adopt(1_000, 4_000));
    }
}
