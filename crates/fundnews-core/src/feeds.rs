use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How a feed's payload is parsed into candidate items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// RSS 2.0 or Atom news feed; items keyed by `url + headline`.
    Rss,
    /// SEC EDGAR current-filings Atom feed; items keyed by `url + published`.
    Sec,
    /// Finnhub `/news` JSON endpoint; requires `FINNHUB_API_KEY`.
    Finnhub,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedKind::Rss => write!(f, "rss"),
            FeedKind::Sec => write!(f, "sec"),
            FeedKind::Finnhub => write!(f, "finnhub"),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
    pub kind: FeedKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Pre-filtered feeds set this to `false` to skip the relevance gate.
    #[serde(default = "default_true")]
    pub needs_filtering: bool,
    /// Apply the English-language heuristic to headline + summary.
    #[serde(default)]
    pub language_check: bool,
    /// Skip entries older than this many days (counted from UTC midnight).
    /// Entries without a parseable date are skipped when this is set.
    pub max_age_days: Option<u32>,
    /// Extra header some publishers require, e.g. SEC's contact `User-Agent`.
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedsFile {
    pub feeds: Vec<FeedConfig>,
}

impl FeedsFile {
    /// Enabled feeds, optionally narrowed to one name (case-insensitive).
    #[must_use]
    pub fn enabled(&self, only: Option<&str>) -> Vec<&FeedConfig> {
        self.feeds
            .iter()
            .filter(|f| f.enabled)
            .filter(|f| only.is_none_or(|name| f.name.eq_ignore_ascii_case(name)))
            .collect()
    }
}

/// Load and validate the feed catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_feeds(path: &Path) -> Result<FeedsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FeedsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let feeds_file: FeedsFile = serde_yaml::from_str(&content)?;

    validate_feeds(&feeds_file)?;

    Ok(feeds_file)
}

fn validate_feeds(feeds_file: &FeedsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for feed in &feeds_file.feeds {
        if feed.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "feed name must be non-empty".to_string(),
            ));
        }

        if !(feed.url.starts_with("http://") || feed.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "feed '{}' has non-http url '{}'",
                feed.name, feed.url
            )));
        }

        if !seen_names.insert(feed.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate feed name: '{}'",
                feed.name
            )));
        }
    }

    Ok(())
}
