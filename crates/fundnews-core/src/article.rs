//! Candidate items, extraction results, and the persisted article record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw publish timestamp as delivered by a feed or API.
///
/// Finnhub sends epoch seconds; RSS/Atom feeds send strings in a handful of
/// formats. Normalization happens in [`crate::timestamp::normalize_published`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishedRaw {
    Epoch(i64),
    Text(String),
}

/// A news item discovered by a feed source, before any fetching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Dedup identity: a fixed-length digest computed by the source.
    pub item_id: String,
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub published_raw: Option<PublishedRaw>,
    /// Feed or API name, e.g. `"PR Newswire"`.
    pub source: String,
    pub category: Option<String>,
    pub related: Option<String>,
}

/// Outcome of fetching and extracting one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    /// Text reached the minimum word count.
    Ok,
    /// Text was extracted but stayed under the minimum word count.
    Short,
    /// HTML was fetched but no strategy produced any text.
    Empty,
    /// The server answered 401 or 403.
    Blocked,
    /// Network failure or any other non-success response.
    Error,
}

impl FetchStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FetchStatus::Ok => "ok",
            FetchStatus::Short => "short",
            FetchStatus::Empty => "empty",
            FetchStatus::Blocked => "blocked",
            FetchStatus::Error => "error",
        }
    }

    /// Whether a record with this status may be stored without `full_text`.
    #[must_use]
    pub fn allows_missing_text(self) -> bool {
        matches!(
            self,
            FetchStatus::Empty | FetchStatus::Blocked | FetchStatus::Error
        )
    }
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of an [`ExtractionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// URL whose HTML was extracted (may be the AMP or canonical variant).
    pub resolved_url: String,
    /// Name of the winning strategy, `"fallback-longest"`, or `None` when
    /// nothing was extracted.
    pub strategy_used: Option<String>,
    pub html_length: usize,
}

/// Result of running the extraction cascade for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: Option<String>,
    pub status: FetchStatus,
    pub error: Option<String>,
    pub http_status: Option<u16>,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// Structured diagnostic string: `outcome:httpStatus|strategy|html=len`.
    ///
    /// Absent parts render as `none`, e.g. `error:none|none|html=0`.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let http = self
            .http_status
            .map_or_else(|| "none".to_string(), |s| s.to_string());
        let strategy = self.metadata.strategy_used.as_deref().unwrap_or("none");
        format!(
            "{}:{http}|{strategy}|html={}",
            self.status, self.metadata.html_length
        )
    }
}

/// Sentiment labels produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Parse a classifier label, case-insensitively.
    ///
    /// Returns `None` for anything outside the fixed label set so that an
    /// unexpected model output leaves the record unlabeled.
    #[must_use]
    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(SentimentLabel::Positive),
            "negative" => Some(SentimentLabel::Negative),
            "neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The persisted article row. `url` is the conflict key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub item_id: String,
    pub headline: String,
    pub summary: String,
    pub full_text: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub source_domain: Option<String>,
    pub category: Option<String>,
    pub related: Option<String>,
    pub sentiment_label: Option<SentimentLabel>,
    pub resolved_url: String,
    pub fetch_status: String,
    pub fetch_error: Option<String>,
    pub inserted_at: DateTime<Utc>,
}
