//! Text cleanup shared by the extraction strategies and feed parsers.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid tag regex"));

/// Strip tags, decode common entities, and collapse whitespace.
#[must_use]
pub fn clean_text(input: &str) -> String {
    let no_tags = TAG_RE.replace_all(input, " ");
    collapse_whitespace(&decode_entities(&no_tags))
}

#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the handful of entities that survive in feed and JSON-LD text.
#[must_use]
pub fn decode_entities(value: &str) -> String {
    value
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
