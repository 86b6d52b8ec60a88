use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("feed request failed: {0}")]
    Fetch(#[from] fundnews_scraper::FetchError),

    #[error("feed parse error: {0}")]
    FeedParse(String),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] fundnews_core::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] fundnews_db::DbError),
}
