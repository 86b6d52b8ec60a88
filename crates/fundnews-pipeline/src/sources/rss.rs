use feed_rs::model::Entry;
use fundnews_core::{CandidateItem, PublishedRaw};
use fundnews_scraper::extract::text::clean_text;

use super::{headline_excerpt, parse_feed_bytes};
use crate::dedup::item_id;
use crate::error::PipelineError;

/// Parse an RSS 2.0 or Atom payload. Items are keyed by `url + headline`.
///
/// # Errors
///
/// Returns [`PipelineError::FeedParse`] if the payload is not a feed.
pub fn parse_rss_feed(bytes: &[u8], source: &str) -> Result<Vec<CandidateItem>, PipelineError> {
    let feed = parse_feed_bytes(bytes)?;
    Ok(feed
        .entries
        .into_iter()
        .filter_map(|entry| normalize_entry(entry, source))
        .collect())
}

fn normalize_entry(entry: Entry, source: &str) -> Option<CandidateItem> {
    let url = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

    let headline = entry
        .title
        .map(|t| clean_text(&t.content))
        .filter(|t| !t.is_empty())?;

    let summary = entry
        .summary
        .map(|s| clean_text(&s.content))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| headline_excerpt(&headline));

    let published_raw = entry
        .published
        .or(entry.updated)
        .map(|dt| PublishedRaw::Text(dt.to_rfc3339()));

    let category = entry
        .categories
        .first()
        .map(|c| c.term.trim().to_string())
        .filter(|t| !t.is_empty());

    Some(CandidateItem {
        item_id: item_id(&url, &headline),
        headline,
        summary,
        url,
        published_raw,
        source: source.to_string(),
        category,
        related: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Wire</title>
    <item>
      <title>Acme Corp Reports Record Q3 Revenue</title>
      <link>https://news.example/acme-q3</link>
      <description>&lt;p&gt;Acme posted &lt;b&gt;record&lt;/b&gt; revenue.&lt;/p&gt;</description>
      <category>Earnings</category>
      <pubDate>Mon, 27 Oct 2025 13:25:00 +0000</pubDate>
    </item>
    <item>
      <title>Globex Names New CFO</title>
      <link>https://news.example/globex-cfo</link>
    </item>
    <item>
      <title>No link here</title>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn parses_items_and_skips_linkless_entries() {
        let items = parse_rss_feed(SAMPLE_RSS.as_bytes(), "Wire").expect("valid rss");
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.headline, "Acme Corp Reports Record Q3 Revenue");
        assert_eq!(first.url, "https://news.example/acme-q3");
        assert_eq!(first.summary, "Acme posted record revenue.");
        assert_eq!(first.category.as_deref(), Some("Earnings"));
        assert_eq!(first.source, "Wire");
        assert_eq!(
            first.item_id,
            item_id("https://news.example/acme-q3", "Acme Corp Reports Record Q3 Revenue")
        );
        assert!(matches!(
            first.published_raw,
            Some(PublishedRaw::Text(ref s)) if s.starts_with("2025-10-27T13:25:00")
        ));
    }

    #[test]
    fn missing_summary_falls_back_to_headline() {
        let items = parse_rss_feed(SAMPLE_RSS.as_bytes(), "Wire").expect("valid rss");
        assert_eq!(items[1].summary, "Globex Names New CFO");
        assert!(items[1].published_raw.is_none());
        assert!(items[1].category.is_none());
    }

    #[test]
    fn parses_atom_entries() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom wire</title>
  <id>urn:wire</id>
  <updated>2025-10-27T10:00:00Z</updated>
  <entry>
    <title>Initech files for IPO</title>
    <link href="https://news.example/initech"/>
    <id>urn:initech</id>
    <updated>2025-10-27T10:00:00Z</updated>
    <summary>Initech plans to list on the NYSE.</summary>
  </entry>
</feed>"#;
        let items = parse_rss_feed(atom.as_bytes(), "Atom wire").expect("valid atom");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://news.example/initech");
        assert_eq!(items[0].summary, "Initech plans to list on the NYSE.");
        assert!(items[0].published_raw.is_some());
    }

    #[test]
    fn non_feed_payload_is_a_parse_error() {
        let err = parse_rss_feed(b"<html><body>nope</body></html>", "Wire").unwrap_err();
        assert!(matches!(err, PipelineError::FeedParse(_)));
    }
}
