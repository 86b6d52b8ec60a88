use fundnews_core::{CandidateItem, PublishedRaw};
use reqwest::Url;
use serde::Deserialize;

use super::headline_excerpt;
use crate::dedup::item_id;
use crate::error::PipelineError;

/// One element of the Finnhub `/news` response.
#[derive(Debug, Deserialize)]
struct FinnhubNews {
    #[serde(default)]
    category: String,
    /// Epoch seconds.
    #[serde(default)]
    datetime: Option<i64>,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    related: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
}

/// Header carrying the API key. Keeping the key out of the query string
/// keeps it out of URLs that reach logs and error messages.
pub const FINNHUB_TOKEN_HEADER: &str = "X-Finnhub-Token";

/// The configured URL with `minId=0` appended if absent.
///
/// # Errors
///
/// Returns [`PipelineError::FeedParse`] if `base` is not a valid URL.
pub fn finnhub_request_url(base: &str) -> Result<String, PipelineError> {
    let mut url =
        Url::parse(base).map_err(|e| PipelineError::FeedParse(format!("bad finnhub url: {e}")))?;
    if !url.query_pairs().any(|(k, _)| k == "minId") {
        url.query_pairs_mut().append_pair("minId", "0");
    }
    Ok(url.into())
}

/// Parse a Finnhub general-news JSON array. Items are keyed by
/// `url + headline`; the publisher named by Finnhub becomes `source`, falling
/// back to `feed_name`.
///
/// # Errors
///
/// Returns [`PipelineError::Json`] if the body is not the expected array.
pub fn parse_finnhub_news(body: &str, feed_name: &str) -> Result<Vec<CandidateItem>, PipelineError> {
    let news: Vec<FinnhubNews> = serde_json::from_str(body)?;
    Ok(news
        .into_iter()
        .filter_map(|n| {
            let url = n.url.trim().to_string();
            let headline = n.headline.trim().to_string();
            if url.is_empty() || headline.is_empty() {
                return None;
            }
            let summary = match n.summary.trim() {
                "" => headline_excerpt(&headline),
                s => s.to_string(),
            };
            let source = match n.source.trim() {
                "" => feed_name.to_string(),
                s => s.to_string(),
            };
            Some(CandidateItem {
                item_id: item_id(&url, &headline),
                headline,
                summary,
                url,
                published_raw: n.datetime.map(PublishedRaw::Epoch),
                source,
                category: Some(n.category).filter(|c| !c.trim().is_empty()),
                related: Some(n.related).filter(|r| !r.trim().is_empty()),
            })
        })
        .collect())
}
