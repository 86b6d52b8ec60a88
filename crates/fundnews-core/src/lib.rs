//! Domain types and configuration shared by every fundnews crate.

pub mod app_config;
pub mod article;
pub mod config;
pub mod feeds;
pub mod timestamp;

pub use app_config::{AppConfig, Environment, SentimentMode};
pub use article::{
    ArticleRecord, CandidateItem, ExtractionMetadata, ExtractionResult, FetchStatus, PublishedRaw,
    SentimentLabel,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use feeds::{load_feeds, FeedConfig, FeedKind, FeedsFile};
pub use timestamp::{normalize_published, parse_timestamp_str};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read feeds file {path}: {source}")]
    FeedsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feeds file: {0}")]
    FeedsFileParse(#[from] serde_yaml::Error),

    #[error("feeds validation failed: {0}")]
    Validation(String),
}
