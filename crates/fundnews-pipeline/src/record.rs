//! Builds the persisted record from a candidate and its extraction result.

use chrono::{DateTime, Utc};
use fundnews_core::{
    normalize_published, ArticleRecord, CandidateItem, ExtractionResult, PublishedRaw,
    SentimentLabel,
};
use fundnews_db::ArticleRow;
use reqwest::Url;

/// Host of `url`, or `None` if it does not parse or has no host.
#[must_use]
pub fn source_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

/// Assemble the record for one processed item.
///
/// `inserted_at` is the write time supplied by the caller. `full_text` is
/// taken from the result as-is, so it is absent exactly when extraction
/// produced nothing.
#[must_use]
pub fn build_record(
    item: &CandidateItem,
    result: &ExtractionResult,
    sentiment_label: Option<SentimentLabel>,
    inserted_at: DateTime<Utc>,
) -> ArticleRecord {
    ArticleRecord {
        url: item.url.clone(),
        item_id: item.item_id.clone(),
        headline: item.headline.clone(),
        summary: item.summary.clone(),
        full_text: result.text.clone(),
        published_at: item.published_raw.as_ref().and_then(normalize_published),
        source: item.source.clone(),
        source_domain: source_domain(&item.url),
        category: item.category.clone(),
        related: item.related.clone(),
        sentiment_label,
        resolved_url: result.metadata.resolved_url.clone(),
        fetch_status: result.diagnostic(),
        fetch_error: result.error.clone(),
        inserted_at,
    }
}

/// Text handed to the sentiment classifier: the summary, or the headline when
/// the summary is blank.
#[must_use]
pub fn sentiment_input(item: &CandidateItem) -> &str {
    if item.summary.trim().is_empty() {
        &item.headline
    } else {
        &item.summary
    }
}

/// Rebuild the candidate a stored row came from, for re-fetching.
#[must_use]
pub fn candidate_from_row(row: &ArticleRow) -> CandidateItem {
    CandidateItem {
        item_id: row.item_id.clone(),
        headline: row.headline.clone(),
        summary: row.summary.clone(),
        url: row.url.clone(),
        published_raw: row
            .published_at
            .map(|dt| PublishedRaw::Text(dt.to_rfc3339())),
        source: row.source.clone(),
        category: row.category.clone(),
        related: row.related.clone(),
    }
}

#[cfg(test)]
mod tests {
    use fundnews_core::{ExtractionMetadata, FetchStatus};

    use super::*;

    fn item(published: Option<PublishedRaw>) -> CandidateItem {
        CandidateItem {
            item_id: "0123456789abcdef".to_string(),
            headline: "Acme beats estimates".to_string(),
            summary: "Acme reported record revenue.".to_string(),
            url: "https://WWW.News.Example:8443/acme?ref=rss".to_string(),
            published_raw: published,
            source: "PR Newswire".to_string(),
            category: Some("earnings".to_string()),
            related: Some("ACME".to_string()),
        }
    }

    fn blocked() -> ExtractionResult {
        ExtractionResult {
            text: None,
            status: FetchStatus::Blocked,
            error: Some("http 403".to_string()),
            http_status: Some(403),
            metadata: ExtractionMetadata {
                resolved_url: "https://www.news.example/acme".to_string(),
                strategy_used: None,
                html_length: 0,
            },
        }
    }

    #[test]
    fn source_domain_is_lowercased_host_without_port() {
        assert_eq!(
            source_domain("https://WWW.News.Example:8443/a").as_deref(),
            Some("www.news.example")
        );
        assert!(source_domain("not a url").is_none());
    }

    #[test]
    fn failed_extraction_still_yields_a_full_record() {
        let now = Utc::now();
        let published = Some(PublishedRaw::Epoch(1_700_000_000));
        let record = build_record(&item(published), &blocked(), None, now);

        assert_eq!(record.url, "https://WWW.News.Example:8443/acme?ref=rss");
        assert_eq!(record.fetch_status, "blocked:403|none|html=0");
        assert_eq!(record.fetch_error.as_deref(), Some("http 403"));
        assert!(record.full_text.is_none());
        assert_eq!(
            record.published_at.map(|t| t.to_rfc3339()).as_deref(),
            Some("2023-11-14T22:13:20+00:00")
        );
        assert_eq!(record.source_domain.as_deref(), Some("www.news.example"));
        assert_eq!(record.resolved_url, "https://www.news.example/acme");
        assert_eq!(record.inserted_at, now);
    }

    #[test]
    fn malformed_published_becomes_null() {
        let record = build_record(
            &item(Some(PublishedRaw::Text("not-a-date".to_string()))),
            &blocked(),
            None,
            Utc::now(),
        );
        assert!(record.published_at.is_none());
    }

    #[test]
    fn sentiment_input_prefers_summary() {
        let mut it = item(None);
        assert_eq!(sentiment_input(&it), "Acme reported record revenue.");
        it.summary = "  ".to_string();
        assert_eq!(sentiment_input(&it), "Acme beats estimates");
    }

    #[test]
    fn row_round_trips_into_a_candidate() {
        let published = Utc::now();
        let row = ArticleRow {
            id: 7,
            url: "https://news.example/a".to_string(),
            item_id: "0123456789abcdef".to_string(),
            headline: "Acme beats estimates".to_string(),
            summary: "Record revenue.".to_string(),
            full_text: None,
            published_at: Some(published),
            source: "Wire".to_string(),
            source_domain: Some("news.example".to_string()),
            category: Some("earnings".to_string()),
            related: None,
            sentiment_label: None,
            resolved_url: "https://news.example/a".to_string(),
            fetch_status: "error:none|none|html=0".to_string(),
            fetch_error: Some("timeout".to_string()),
            inserted_at: published,
        };

        let candidate = candidate_from_row(&row);

        assert_eq!(candidate.url, row.url);
        assert_eq!(candidate.item_id, row.item_id);
        assert_eq!(candidate.category.as_deref(), Some("earnings"));
        let normalized = candidate.published_raw.as_ref().and_then(normalize_published);
        assert_eq!(normalized.map(|t| t.timestamp()), Some(published.timestamp()));
    }
}
