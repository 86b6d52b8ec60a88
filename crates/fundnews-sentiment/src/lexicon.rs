//! Finance-news lexicon scorer.

use async_trait::async_trait;
use fundnews_core::SentimentLabel;

use crate::classifier::SentimentClassifier;
use crate::error::SentimentError;

/// Word weights for market and corporate news.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("beat", 0.4),
    ("beats", 0.4),
    ("exceeded", 0.4),
    ("growth", 0.3),
    ("gain", 0.3),
    ("gains", 0.3),
    ("surge", 0.5),
    ("surges", 0.5),
    ("soar", 0.5),
    ("soars", 0.5),
    ("rally", 0.4),
    ("record", 0.3),
    ("profit", 0.3),
    ("profitable", 0.4),
    ("upgrade", 0.4),
    ("upgraded", 0.4),
    ("raises", 0.3),
    ("raised", 0.3),
    ("strong", 0.3),
    ("outperform", 0.4),
    ("approval", 0.4),
    ("approved", 0.4),
    ("expands", 0.3),
    ("dividend", 0.2),
    // Negative signals
    ("miss", -0.4),
    ("misses", -0.4),
    ("missed", -0.4),
    ("loss", -0.4),
    ("losses", -0.4),
    ("decline", -0.4),
    ("declines", -0.4),
    ("plunge", -0.6),
    ("plunges", -0.6),
    ("slump", -0.5),
    ("downgrade", -0.5),
    ("downgraded", -0.5),
    ("cuts", -0.3),
    ("layoffs", -0.5),
    ("lawsuit", -0.5),
    ("investigation", -0.4),
    ("fraud", -0.7),
    ("bankruptcy", -0.8),
    ("default", -0.6),
    ("recall", -0.5),
    ("weak", -0.3),
    ("warning", -0.4),
    ("delisted", -0.6),
    ("resigns", -0.3),
];

/// Scores at or inside this band are `neutral`.
const NEUTRAL_BAND: f32 = 0.15;

/// Score a text string using the finance lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

#[must_use]
pub fn label_for_score(score: f32) -> SentimentLabel {
    if score > NEUTRAL_BAND {
        SentimentLabel::Positive
    } else if score < -NEUTRAL_BAND {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Deterministic in-process classifier backed by [`lexicon_score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<Option<SentimentLabel>, SentimentError> {
        Ok(Some(label_for_score(lexicon_score(text))))
    }
}
