use std::sync::LazyLock;

use feed_rs::model::Entry;
use fundnews_core::{CandidateItem, PublishedRaw};
use fundnews_scraper::extract::text::clean_text;
use regex::Regex;

use super::parse_feed_bytes;
use crate::dedup::item_id;
use crate::error::PipelineError;

static CIK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{10})\)").expect("valid CIK regex"));

/// Parse the SEC EDGAR current-filings Atom feed.
///
/// Titles look like `8-K - ACME CORP (0001234567) (Filer)`: the form type
/// becomes the category and the ten-digit CIK becomes `related`. Items are
/// keyed by `url + published`.
///
/// # Errors
///
/// Returns [`PipelineError::FeedParse`] if the payload is not a feed.
pub fn parse_sec_feed(bytes: &[u8], source: &str) -> Result<Vec<CandidateItem>, PipelineError> {
    let feed = parse_feed_bytes(bytes)?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| normalize_filing(entry, source))
        .collect())
}

fn normalize_filing(entry: Entry, source: &str) -> Option<CandidateItem> {
    let url = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())?;
    let headline = entry
        .title
        .map(|t| clean_text(&t.content))
        .filter(|t| !t.is_empty())?;

    let form_type = headline
        .split(" - ")
        .next()
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != headline)
        .map(str::to_string);
    let related = CIK_RE
        .captures(&headline)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let published = entry.published.or(entry.updated).map(|dt| dt.to_rfc3339());

    Some(CandidateItem {
        item_id: item_id(&url, published.as_deref().unwrap_or_default()),
        summary: form_type.clone().unwrap_or_else(|| headline.clone()),
        headline,
        url,
        published_raw: published.map(PublishedRaw::Text),
        source: source.to_string(),
        category: form_type,
        related,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Latest Filings</title>
  <id>urn:sec</id>
  <updated>2025-10-27T16:05:12-04:00</updated>
  <entry>
    <title>8-K - ACME CORP (0001234567) (Filer)</title>
    <link rel="alternate" type="text/html" href="https://www.sec.gov/Archives/edgar/data/1234567/000123456725000001-index.htm"/>
    <summary type="html">Item 2.02: Results of Operations</summary>
    <updated>2025-10-27T16:05:12-04:00</updated>
    <id>urn:tag:sec.gov,2008:accession-number=0001234567-25-000001</id>
  </entry>
  <entry>
    <title>Untyped filing</title>
    <link href="https://www.sec.gov/Archives/edgar/data/7654321/x-index.htm"/>
    <updated>2025-10-27T16:00:00-04:00</updated>
    <id>urn:x</id>
  </entry>
</feed>"#;

    #[test]
    fn extracts_form_type_and_cik() {
        let items = parse_sec_feed(SAMPLE_ATOM.as_bytes(), "SEC").expect("valid atom");
        assert_eq!(items.len(), 2);

        let filing = &items[0];
        assert_eq!(filing.category.as_deref(), Some("8-K"));
        assert_eq!(filing.summary, "8-K");
        assert_eq!(filing.related.as_deref(), Some("0001234567"));
        assert_eq!(filing.source, "SEC");
        let Some(PublishedRaw::Text(published)) = &filing.published_raw else {
            panic!("expected a published timestamp");
        };
        assert_eq!(filing.item_id, item_id(&filing.url, published));
    }

    #[test]
    fn title_without_separator_uses_headline_as_summary() {
        let items = parse_sec_feed(SAMPLE_ATOM.as_bytes(), "SEC").expect("valid atom");
        let untyped = &items[1];
        assert!(untyped.category.is_none());
        assert!(untyped.related.is_none());
        assert_eq!(untyped.summary, "Untyped filing");
    }
}
