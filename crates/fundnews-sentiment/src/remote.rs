//! Client for a hosted FinBERT-style text-classification endpoint.
//!
//! Request: `POST {url}` with `{"inputs": "<text>"}` and a bearer token.
//! Response: either `[[{"label": .., "score": ..}, ..]]` or the flat
//! `[{"label": .., "score": ..}, ..]`. The highest-scoring label wins.

use std::time::Duration;

use async_trait::async_trait;
use fundnews_core::SentimentLabel;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::classifier::SentimentClassifier;
use crate::error::SentimentError;

/// Inputs past this many characters are cut; the model truncates to its
/// token window anyway.
const MAX_INPUT_CHARS: usize = 2_000;

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn top_label(self) -> Option<String> {
        let scores = match self {
            InferenceResponse::Nested(batches) => batches.into_iter().next().unwrap_or_default(),
            InferenceResponse::Flat(scores) => scores,
        };
        scores
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|s| s.label)
    }
}

pub struct RemoteClassifier {
    client: Client,
    url: String,
    api_key: String,
}

impl RemoteClassifier {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, SentimentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
            api_key: api_key.to_owned(),
        })
    }
}

impl std::fmt::Debug for RemoteClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClassifier")
            .field("url", &self.url)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SentimentClassifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(&self, text: &str) -> Result<Option<SentimentLabel>, SentimentError> {
        let inputs = truncate_chars(text, MAX_INPUT_CHARS);
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&InferenceRequest { inputs })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::Endpoint {
                status: status.as_u16(),
                body: truncate_chars(&body, 200).to_string(),
            });
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::Response(e.to_string()))?;

        let Some(raw) = parsed.top_label() else {
            return Err(SentimentError::Response("no labels returned".to_string()));
        };
        let label = SentimentLabel::parse_label(&raw);
        if label.is_none() {
            tracing::debug!(label = %raw, "classifier returned a label outside the fixed set");
        }
        Ok(label)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
