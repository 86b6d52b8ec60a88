use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fundnews_core::{AppConfig, SentimentLabel, SentimentMode};

use crate::error::SentimentError;
use crate::lexicon::LexiconClassifier;
use crate::remote::RemoteClassifier;

/// Maps a short text to one of the fixed sentiment labels.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Classify `text`. `Ok(None)` means the classifier produced a label
    /// outside the fixed set.
    async fn classify(&self, text: &str) -> Result<Option<SentimentLabel>, SentimentError>;
}

/// Build the classifier selected by `FUNDNEWS_SENTIMENT_MODE`.
///
/// # Errors
///
/// Returns [`SentimentError::Config`] if remote mode lacks an API key, or
/// [`SentimentError::Http`] if the HTTP client cannot be constructed.
pub fn build_classifier(
    config: &AppConfig,
) -> Result<Arc<dyn SentimentClassifier>, SentimentError> {
    match config.sentiment_mode {
        SentimentMode::Lexicon => Ok(Arc::new(LexiconClassifier)),
        SentimentMode::Remote => {
            let api_key = config.sentiment_api_key.as_deref().ok_or_else(|| {
                SentimentError::Config("FUNDNEWS_SENTIMENT_API_KEY is not set".to_string())
            })?;
            let remote = RemoteClassifier::new(
                &config.sentiment_url,
                api_key,
                config.sentiment_timeout_secs,
            )?;
            Ok(Arc::new(remote))
        }
    }
}

/// Label `text`, never failing.
///
/// Blank text, a classifier error, and a timeout all yield `None`; errors and
/// timeouts are logged.
pub async fn label_with_timeout(
    classifier: &dyn SentimentClassifier,
    text: &str,
    timeout: Duration,
) -> Option<SentimentLabel> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match tokio::time::timeout(timeout, classifier.classify(text)).await {
        Ok(Ok(label)) => label,
        Ok(Err(e)) => {
            tracing::warn!(classifier = classifier.name(), error = %e, "sentiment classification failed");
            None
        }
        Err(_) => {
            tracing::warn!(
                classifier = classifier.name(),
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "sentiment classification timed out"
            );
            None
        }
    }
}
