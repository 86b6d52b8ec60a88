use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which sentiment adapter the pipeline is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentMode {
    /// Hosted FinBERT-style inference endpoint.
    Remote,
    /// Deterministic in-process lexicon scorer.
    Lexicon,
}

impl std::fmt::Display for SentimentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentimentMode::Remote => write!(f, "remote"),
            SentimentMode::Lexicon => write!(f, "lexicon"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub feeds_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub fetch_user_agent: String,
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
    pub min_words: usize,
    pub relevance_min_matches: usize,
    pub max_concurrent_items: usize,
    pub inter_feed_delay_ms: u64,
    pub sentiment_mode: SentimentMode,
    pub sentiment_url: String,
    pub sentiment_api_key: Option<String>,
    pub sentiment_timeout_secs: u64,
    pub finnhub_api_key: Option<String>,
}

impl AppConfig {
    /// Return the database URL or fail with the variable that must be set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }

    /// Return the Finnhub API key or fail with the variable that must be set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `FINNHUB_API_KEY` was not set.
    pub fn require_finnhub_api_key(&self) -> Result<&str, ConfigError> {
        self.finnhub_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("FINNHUB_API_KEY".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("feeds_path", &self.feeds_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .field("min_words", &self.min_words)
            .field("relevance_min_matches", &self.relevance_min_matches)
            .field("max_concurrent_items", &self.max_concurrent_items)
            .field("inter_feed_delay_ms", &self.inter_feed_delay_ms)
            .field("sentiment_mode", &self.sentiment_mode)
            .field("sentiment_url", &self.sentiment_url)
            .field(
                "sentiment_api_key",
                &self.sentiment_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("sentiment_timeout_secs", &self.sentiment_timeout_secs)
            .field(
                "finnhub_api_key",
                &self.finnhub_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
