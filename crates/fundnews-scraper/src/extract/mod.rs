//! Article body extraction.
//!
//! An [`ExtractionCascade`] runs its strategies in order and stops at the
//! first one whose output reaches `min_words`. Output of every strategy that
//! fell short is kept, and the longest of those becomes the fallback.

mod article_tag;
mod density;
mod json_ld;
mod readability;
pub mod text;

pub use article_tag::ArticleTagStrategy;
pub use density::DensityStrategy;
pub use json_ld::JsonLdStrategy;
pub use readability::ReadabilityStrategy;

use fundnews_core::{ExtractionMetadata, ExtractionResult, FetchStatus};

use crate::resolve::ResolvedPage;

/// Strategy name recorded when no strategy reached the word threshold.
pub const FALLBACK_STRATEGY: &str = "fallback-longest";

/// One way of turning HTML into article text.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable identifier recorded in `strategy_used`.
    fn name(&self) -> &'static str;

    /// Return the extracted text, or `None` if this strategy found nothing.
    fn extract(&self, html: &str, url: &str) -> Option<String>;
}

pub struct ExtractionCascade {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    min_words: usize,
}

impl std::fmt::Debug for ExtractionCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionCascade")
            .field("strategies", &self.strategy_names())
            .field("min_words", &self.min_words)
            .finish()
    }
}

impl ExtractionCascade {
    /// Cascade with the default strategy order: readability, JSON-LD,
    /// DOM density, `<article>` paragraphs.
    #[must_use]
    pub fn new(min_words: usize) -> Self {
        Self::with_strategies(default_strategies(), min_words)
    }

    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>, min_words: usize) -> Self {
        Self {
            strategies,
            min_words,
        }
    }

    #[must_use]
    pub fn min_words(&self) -> usize {
        self.min_words
    }

    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract article text from a resolved page.
    ///
    /// A page without HTML becomes `blocked` (401/403) or `error`, carrying
    /// the fetch error or `no_html`.
    #[must_use]
    pub fn extract_page(&self, page: &ResolvedPage) -> ExtractionResult {
        match page.html.as_deref() {
            Some(html) => {
                let mut result = self.extract(html, &page.url);
                result.http_status = page.http_status;
                result
            }
            None => {
                let status = if matches!(page.http_status, Some(401 | 403)) {
                    FetchStatus::Blocked
                } else {
                    FetchStatus::Error
                };
                ExtractionResult {
                    text: None,
                    status,
                    error: Some(page.error.clone().unwrap_or_else(|| "no_html".to_string())),
                    http_status: page.http_status,
                    metadata: ExtractionMetadata {
                        resolved_url: page.url.clone(),
                        strategy_used: None,
                        html_length: 0,
                    },
                }
            }
        }
    }

    /// Run the strategies against `html`.
    ///
    /// Returns `ok` with the first text reaching `min_words`; otherwise the
    /// longest (by characters) partial output as `short`; otherwise `empty`.
    #[must_use]
    pub fn extract(&self, html: &str, url: &str) -> ExtractionResult {
        let mut partials: Vec<(&'static str, String)> = Vec::new();

        for strategy in &self.strategies {
            let name = strategy.name();
            let Some(text) = strategy
                .extract(html, url)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
            else {
                tracing::trace!(strategy = name, url, "strategy produced no text");
                continue;
            };

            let words = word_count(&text);
            if words >= self.min_words {
                tracing::debug!(strategy = name, url, words, "extraction accepted");
                return build_result(Some(text), FetchStatus::Ok, None, url, Some(name), html);
            }
            tracing::trace!(strategy = name, url, words, "strategy output below threshold");
            partials.push((name, text));
        }

        // First of equal-length candidates wins.
        let longest = partials
            .into_iter()
            .reduce(|best, next| if next.1.len() > best.1.len() { next } else { best });

        match longest {
            Some((_, text)) => {
                let status = if word_count(&text) >= self.min_words {
                    FetchStatus::Ok
                } else {
                    FetchStatus::Short
                };
                build_result(Some(text), status, None, url, Some(FALLBACK_STRATEGY), html)
            }
            None => build_result(
                None,
                FetchStatus::Empty,
                Some("extract_failed".to_string()),
                url,
                None,
                html,
            ),
        }
    }
}

fn build_result(
    text: Option<String>,
    status: FetchStatus,
    error: Option<String>,
    url: &str,
    strategy: Option<&str>,
    html: &str,
) -> ExtractionResult {
    ExtractionResult {
        text,
        status,
        error,
        http_status: None,
        metadata: ExtractionMetadata {
            resolved_url: url.to_string(),
            strategy_used: strategy.map(str::to_string),
            html_length: html.len(),
        },
    }
}

#[must_use]
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(ReadabilityStrategy),
        Box::new(JsonLdStrategy),
        Box::new(DensityStrategy),
        Box::new(ArticleTagStrategy),
    ]
}

/// Whitespace-delimited word count.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
#[path = "cascade_test.rs"]
mod tests;
