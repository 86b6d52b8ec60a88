//! `articleBody` from schema.org JSON-LD blocks.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::text::clean_text;
use super::ExtractionStrategy;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid json-ld script regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdStrategy;

impl ExtractionStrategy for JsonLdStrategy {
    fn name(&self) -> &'static str {
        "json-ld"
    }

    fn extract(&self, html: &str, _url: &str) -> Option<String> {
        let mut best = String::new();
        for cap in SCRIPT_RE.captures_iter(html) {
            let raw = cap.get(1).map_or("", |m| m.as_str()).trim();
            if raw.is_empty() {
                continue;
            }
            let Ok(value) = serde_json::from_str::<Value>(raw) else {
                continue;
            };
            let mut bodies = Vec::new();
            collect_article_bodies(&value, &mut bodies);
            for body in bodies {
                if body.len() > best.len() {
                    best = body;
                }
            }
        }
        (!best.is_empty()).then_some(best)
    }
}

fn collect_article_bodies(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if looks_like_article_node(map.get("@type")) {
                if let Some(body) = map.get("articleBody").and_then(Value::as_str) {
                    let body = clean_text(body);
                    if !body.is_empty() {
                        out.push(body);
                    }
                }
            }
            for child in map.values() {
                collect_article_bodies(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_article_bodies(child, out);
            }
        }
        _ => {}
    }
}

fn contains_article_token(value: &str) -> bool {
    let lower = value.to_lowercase();
    lower.contains("article") || lower.contains("blogposting") || lower.contains("pressrelease")
}

fn looks_like_article_node(node_type: Option<&Value>) -> bool {
    match node_type {
        Some(Value::String(s)) => contains_article_token(s),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .any(contains_article_token),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_article_body_from_graph() {
        let html = r#"<html><head><script type="application/ld+json">
        {"@context":"https://schema.org","@graph":[
            {"@type":"WebPage","name":"Home"},
            {"@type":["NewsArticle"],"headline":"Acme beats","articleBody":"Acme Corp reported record revenue &amp; profit."}
        ]}
        </script></head><body></body></html>"#;
        let text = JsonLdStrategy.extract(html, "https://news.example/a");
        assert_eq!(
            text.as_deref(),
            Some("Acme Corp reported record revenue & profit.")
        );
    }

    #[test]
    fn picks_longest_body_across_blocks() {
        let html = r#"
        <script type="application/ld+json">{"@type":"Article","articleBody":"short body"}</script>
        <script type='application/ld+json'>{"@type":"BlogPosting","articleBody":"a noticeably longer article body"}</script>
        "#;
        let text = JsonLdStrategy.extract(html, "https://news.example/a");
        assert_eq!(text.as_deref(), Some("a noticeably longer article body"));
    }

    #[test]
    fn ignores_malformed_json_and_non_article_nodes() {
        let html = r#"
        <script type="application/ld+json">{not json</script>
        <script type="application/ld+json">{"@type":"Organization","articleBody":"nope"}</script>
        "#;
        assert!(JsonLdStrategy.extract(html, "https://news.example/a").is_none());
    }
}
