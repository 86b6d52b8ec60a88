use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::*;

struct Fixed {
    name: &'static str,
    output: Option<&'static str>,
    calls: Arc<AtomicU32>,
}

impl ExtractionStrategy for Fixed {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, _html: &str, _url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output.map(str::to_string)
    }
}

fn fixed(
    name: &'static str,
    output: Option<&'static str>,
) -> (Box<dyn ExtractionStrategy>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let strategy: Box<dyn ExtractionStrategy> = Box::new(Fixed {
        name,
        output,
        calls: Arc::clone(&calls),
    });
    (strategy, calls)
}

const HTML: &str = "<html><body>stub</body></html>";
const URL: &str = "https://news.example/story";

#[test]
fn first_strategy_reaching_threshold_wins() {
    let (a, a_calls) = fixed("a", Some("one two"));
    let (b, b_calls) = fixed("b", Some("one two three four"));
    let (c, c_calls) = fixed("c", Some("one two three four five six"));
    let cascade = ExtractionCascade::with_strategies(vec![a, b, c], 3);

    let result = cascade.extract(HTML, URL);

    assert_eq!(result.status, FetchStatus::Ok);
    assert_eq!(result.text.as_deref(), Some("one two three four"));
    assert_eq!(result.metadata.strategy_used.as_deref(), Some("b"));
    assert_eq!(result.metadata.html_length, HTML.len());
    assert_eq!(result.metadata.resolved_url, URL);
    assert!(result.error.is_none());
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    assert_eq!(c_calls.load(Ordering::SeqCst), 0, "later strategies must not run");
}

#[test]
fn longest_partial_is_used_when_nothing_reaches_threshold() {
    let (a, _) = fixed("a", Some("short text"));
    let (b, _) = fixed("b", Some("a somewhat longer text"));
    let (c, _) = fixed("c", None);
    let cascade = ExtractionCascade::with_strategies(vec![a, b, c], 150);

    let result = cascade.extract(HTML, URL);

    assert_eq!(result.status, FetchStatus::Short);
    assert_eq!(result.text.as_deref(), Some("a somewhat longer text"));
    assert_eq!(
        result.metadata.strategy_used.as_deref(),
        Some(FALLBACK_STRATEGY)
    );
}

#[test]
fn equal_length_partials_keep_the_earlier_one() {
    let (a, _) = fixed("a", Some("abc def"));
    let (b, _) = fixed("b", Some("xyz uvw"));
    let cascade = ExtractionCascade::with_strategies(vec![a, b], 10);
    assert_eq!(cascade.extract(HTML, URL).text.as_deref(), Some("abc def"));
}

#[test]
fn whitespace_only_output_counts_as_nothing() {
    let (a, _) = fixed("a", Some("   \n\t "));
    let (b, _) = fixed("b", None);
    let cascade = ExtractionCascade::with_strategies(vec![a, b], 1);

    let result = cascade.extract(HTML, URL);

    assert_eq!(result.status, FetchStatus::Empty);
    assert!(result.text.is_none());
    assert_eq!(result.error.as_deref(), Some("extract_failed"));
    assert!(result.metadata.strategy_used.is_none());
    assert_eq!(result.diagnostic(), format!("empty:none|none|html={}", HTML.len()));
}

#[test]
fn page_without_html_is_blocked_on_403() {
    let cascade = ExtractionCascade::new(150);
    let page = ResolvedPage {
        url: URL.to_string(),
        html: None,
        http_status: Some(403),
        error: Some("http 403".to_string()),
    };

    let result = cascade.extract_page(&page);

    assert_eq!(result.status, FetchStatus::Blocked);
    assert_eq!(result.http_status, Some(403));
    assert_eq!(result.error.as_deref(), Some("http 403"));
    assert_eq!(result.diagnostic(), "blocked:403|none|html=0");
}

#[test]
fn page_without_html_or_status_is_error_no_html() {
    let cascade = ExtractionCascade::new(150);
    let page = ResolvedPage {
        url: URL.to_string(),
        html: None,
        http_status: None,
        error: None,
    };

    let result = cascade.extract_page(&page);

    assert_eq!(result.status, FetchStatus::Error);
    assert_eq!(result.error.as_deref(), Some("no_html"));
    assert_eq!(result.diagnostic(), "error:none|none|html=0");
}

#[test]
fn extract_page_carries_http_status() {
    let (a, _) = fixed("a", Some("enough words here"));
    let cascade = ExtractionCascade::with_strategies(vec![a], 3);
    let page = ResolvedPage {
        url: URL.to_string(),
        html: Some(HTML.to_string()),
        http_status: Some(200),
        error: None,
    };

    let result = cascade.extract_page(&page);

    assert_eq!(result.http_status, Some(200));
    assert_eq!(
        result.diagnostic(),
        format!("ok:200|a|html={}", HTML.len())
    );
}

#[test]
fn default_cascade_order() {
    let cascade = ExtractionCascade::new(150);
    assert_eq!(
        cascade.strategy_names(),
        vec!["readability", "json-ld", "dom-density", "article-tag"]
    );
}

#[test]
fn word_count_splits_on_any_whitespace() {
    assert_eq!(word_count("  one\ttwo\nthree  "), 3);
    assert_eq!(word_count(""), 0);
}

#[test]
fn any_input_yields_exactly_one_result() {
    let cascade = ExtractionCascade::new(150);
    for html in ["", "<<<not html", "<html><body><p>tiny</p></body></html>"] {
        let result = cascade.extract(html, URL);
        assert!(
            matches!(result.status, FetchStatus::Empty | FetchStatus::Short),
            "{html:?} -> {:?}",
            result.status
        );
        assert_eq!(result.metadata.html_length, html.len());
        assert_eq!(result.text.is_none(), result.status == FetchStatus::Empty);
    }
}

#[test]
fn debug_lists_strategies_and_threshold() {
    let rendered = format!("{:?}", ExtractionCascade::new(150));
    assert!(rendered.starts_with("ExtractionCascade"));
    assert!(rendered.contains("min_words: 150"));
    for name in ExtractionCascade::new(150).strategy_names() {
        assert!(rendered.contains(name), "{rendered}");
    }
}
