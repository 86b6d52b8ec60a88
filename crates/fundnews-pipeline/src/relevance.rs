//! Finance relevance and English-language heuristics.
//!
//! Both checks are token based: text is lowercased and split on anything
//! that is not a letter, digit, or `&` (so `S&P` survives as one token).
//! Multi-word keywords match as consecutive tokens.

use std::collections::HashSet;

/// Finance vocabulary. An item is relevant when enough distinct entries
/// appear in its headline, summary, or body.
pub const FINANCIAL_KEYWORDS: &[&str] = &[
    "stock",
    "stocks",
    "equity",
    "equities",
    "nasdaq",
    "nyse",
    "trading",
    "trade",
    "earnings",
    "revenue",
    "profit",
    "loss",
    "quarterly",
    "q1",
    "q2",
    "q3",
    "q4",
    "forecast",
    "guidance",
    "dividend",
    "dividends",
    "ipo",
    "merger",
    "acquisition",
    "investor",
    "investment",
    "portfolio",
    "market",
    "markets",
    "share",
    "shares",
    "financial",
    "finance",
    "bank",
    "banking",
    "fund",
    "hedge fund",
    "etf",
    "mutual fund",
    "analyst",
    "dow",
    "s&p",
    "index",
    "indices",
    "cryptocurrency",
    "bitcoin",
    "btc",
    "crypto",
    "blockchain",
    "fda approval",
    "clinical trial",
    "biotech",
    "pharma",
    "ceo",
    "cfo",
    "executive",
    "board",
    "outlook",
    "expenses",
    "income",
    "balance sheet",
    "cash flow",
    "securities",
    "bond",
    "bonds",
    "debt",
    "credit",
];

/// Short English function words used by [`looks_like_target_language`].
const ENGLISH_MARKERS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see", "two",
    "who", "its", "may", "way", "from", "news",
];

/// Distinct markers needed before text counts as English.
const MIN_ENGLISH_MARKERS: usize = 2;

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '&'))
        .filter(|t| !t.is_empty() && *t != "&")
        .map(str::to_owned)
        .collect()
}

/// Number of distinct [`FINANCIAL_KEYWORDS`] present in `text`.
#[must_use]
pub fn keyword_matches(text: &str) -> usize {
    let tokens = tokenize(text);
    let vocabulary: HashSet<&str> = tokens.iter().map(String::as_str).collect();

    FINANCIAL_KEYWORDS
        .iter()
        .filter(|keyword| {
            let parts: Vec<&str> = keyword.split_whitespace().collect();
            if let [single] = parts.as_slice() {
                vocabulary.contains(single)
            } else {
                tokens
                    .windows(parts.len())
                    .any(|window| window.iter().map(String::as_str).eq(parts.iter().copied()))
            }
        })
        .count()
}

/// Whether the item mentions at least `min_matches` distinct finance keywords
/// across headline, summary, and full text.
#[must_use]
pub fn is_relevant(headline: &str, summary: &str, full_text: &str, min_matches: usize) -> bool {
    let combined = format!("{headline} {summary} {full_text}");
    keyword_matches(&combined) >= min_matches
}

/// Cheap English check: at least two distinct common function words.
///
/// Blank text passes so that items without a summary are not dropped.
#[must_use]
pub fn looks_like_target_language(text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    let tokens: HashSet<String> = tokenize(text).into_iter().collect();
    let found = ENGLISH_MARKERS
        .iter()
        .filter(|marker| tokens.contains(**marker))
        .count();
    found >= MIN_ENGLISH_MARKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earnings_headline_is_relevant() {
        assert!(is_relevant(
            "Tesla shares surge after earnings beat",
            "",
            "",
            1
        ));
    }

    #[test]
    fn bakery_headline_is_not_relevant() {
        assert!(!is_relevant("Local bakery wins award", "", "", 1));
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(keyword_matches("Open the window to the meadow"), 0);
        assert_eq!(keyword_matches("The Dow closed higher"), 1);
    }

    #[test]
    fn phrases_match_consecutive_tokens() {
        assert_eq!(keyword_matches("free cash flow improved"), 1);
        assert_eq!(keyword_matches("cash and flow"), 0);
    }

    #[test]
    fn ampersand_ticker_survives_tokenization() {
        assert_eq!(keyword_matches("S&P 500 hits record"), 1);
    }

    #[test]
    fn full_text_contributes_to_relevance() {
        assert!(is_relevant(
            "Company announces update",
            "",
            "The board approved a dividend increase.",
            2
        ));
    }

    #[test]
    fn threshold_counts_distinct_keywords() {
        assert!(!is_relevant("stock stock stock", "", "", 2));
        assert!(is_relevant("stock and bonds", "", "", 2));
    }

    #[test]
    fn english_needs_two_markers() {
        assert!(looks_like_target_language(
            "Acme and Globex announce the merger"
        ));
        assert!(!looks_like_target_language("Acme annonce une fusion"));
        assert!(!looks_like_target_language("the Übernahme"));
    }

    #[test]
    fn blank_text_passes_language_check() {
        assert!(looks_like_target_language(""));
        assert!(looks_like_target_language("   "));
    }
}
