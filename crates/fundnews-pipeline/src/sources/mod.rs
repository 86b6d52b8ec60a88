//! Feed sources: turn a feed payload into candidate items.

mod finnhub;
mod rss;
mod sec;

pub use finnhub::{finnhub_request_url, parse_finnhub_news, FINNHUB_TOKEN_HEADER};
pub use rss::parse_rss_feed;
pub use sec::parse_sec_feed;

use fundnews_core::{CandidateItem, ConfigError, FeedConfig, FeedKind};
use fundnews_scraper::{HttpFetcher, TextRequest, ACCEPT_FEED, ACCEPT_JSON};

use crate::error::PipelineError;

/// Characters of headline used as the summary when an entry has none.
const SUMMARY_FALLBACK_CHARS: usize = 200;

/// Download a feed and normalize its entries.
///
/// Entries without a link or headline are dropped during parsing.
///
/// # Errors
///
/// Returns [`PipelineError::Fetch`] if the payload cannot be downloaded,
/// [`PipelineError::FeedParse`] / [`PipelineError::Json`] if it cannot be
/// parsed, or [`PipelineError::Config`] if a Finnhub feed has no API key.
pub async fn fetch_candidates(
    fetcher: &HttpFetcher,
    feed: &FeedConfig,
    finnhub_api_key: Option<&str>,
) -> Result<Vec<CandidateItem>, PipelineError> {
    let xml = TextRequest {
        accept: Some(ACCEPT_FEED),
        user_agent: feed.user_agent.as_deref(),
        secret_header: None,
    };
    let items = match feed.kind {
        FeedKind::Rss => {
            let body = fetcher.get_text(&feed.url, xml).await?;
            parse_rss_feed(body.as_bytes(), &feed.name)?
        }
        FeedKind::Sec => {
            let body = fetcher.get_text(&feed.url, xml).await?;
            parse_sec_feed(body.as_bytes(), &feed.name)?
        }
        FeedKind::Finnhub => {
            let key = finnhub_api_key
                .ok_or_else(|| ConfigError::MissingEnvVar("FINNHUB_API_KEY".to_string()))?;
            let url = finnhub_request_url(&feed.url)?;
            let request = TextRequest {
                accept: Some(ACCEPT_JSON),
                secret_header: Some((FINNHUB_TOKEN_HEADER, key)),
                ..xml
            };
            let body = fetcher.get_text(&url, request).await?;
            parse_finnhub_news(&body, &feed.name)?
        }
    };

    tracing::info!(feed = %feed.name, kind = %feed.kind, count = items.len(), "feed parsed");
    Ok(items)
}

/// First `SUMMARY_FALLBACK_CHARS` characters of `headline`.
fn headline_excerpt(headline: &str) -> String {
    headline.chars().take(SUMMARY_FALLBACK_CHARS).collect()
}

fn parse_feed_bytes(bytes: &[u8]) -> Result<feed_rs::model::Feed, PipelineError> {
    feed_rs::parser::parse(bytes).map_err(|e| PipelineError::FeedParse(e.to_string()))
}
