//! Highest text-density DOM block.
//!
//! Scores `article`, `main`, `section`, and `div` elements by non-link text
//! length, with a bonus for semantic article containers and a penalty for
//! link-heavy blocks. Containers whose class or id names navigation chrome
//! are skipped.

use scraper::{ElementRef, Html, Selector};

use super::text::collapse_whitespace;
use super::ExtractionStrategy;

const MAX_ELEMENTS: usize = 20_000;
const MIN_BLOCK_CHARS: usize = 20;

const BOILERPLATE_MARKERS: [&str; 17] = [
    "nav",
    "navbar",
    "navigation",
    "menu",
    "sidebar",
    "footer",
    "header",
    "banner",
    "cookie",
    "consent",
    "ad",
    "ads",
    "advert",
    "promo",
    "subscribe",
    "newsletter",
    "related",
];

/// Tokens that mark a block as part of the story even when it also names a
/// boilerplate role, as in `article-header`.
const CONTENT_MARKERS: [&str; 6] = ["article", "story", "content", "post", "entry", "body"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DensityStrategy;

impl ExtractionStrategy for DensityStrategy {
    fn name(&self) -> &'static str {
        "dom-density"
    }

    fn extract(&self, html: &str, _url: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let blocks = Selector::parse("article, main, section, div").ok()?;
        let links = Selector::parse("a").ok()?;

        let mut best_score: i64 = 0;
        let mut best_text: Option<String> = None;

        for el in doc.select(&blocks).take(MAX_ELEMENTS) {
            if is_boilerplate_container(&el) {
                continue;
            }
            let chars = text_chars(&el);
            if chars < MIN_BLOCK_CHARS {
                continue;
            }
            let link_chars: usize = el.select(&links).map(|a| text_chars(&a)).sum();

            let mut score = to_i64(chars) - 2 * to_i64(link_chars);
            match el.value().name() {
                "article" => score += 500,
                "main" => score += 300,
                _ => {}
            }
            if link_chars > chars / 2 {
                score -= 500;
            }
            if score > best_score {
                best_score = score;
                best_text = Some(collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")));
            }
        }

        best_text.filter(|t| !t.is_empty())
    }
}

fn text_chars(el: &ElementRef<'_>) -> usize {
    el.text().map(|t| t.chars().count()).sum()
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn is_boilerplate_container(el: &ElementRef<'_>) -> bool {
    let attrs = [el.value().attr("class"), el.value().attr("id")];
    let tokens: Vec<String> = attrs
        .into_iter()
        .flatten()
        .flat_map(|value| value.split(|c: char| c.is_whitespace() || c == '-' || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    any_token_in(&tokens, &BOILERPLATE_MARKERS) && !any_token_in(&tokens, &CONTENT_MARKERS)
}

fn any_token_in(tokens: &[String], markers: &[&str]) -> bool {
    tokens
        .iter()
        .any(|token| markers.iter().any(|marker| token.as_str() == *marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_dense_article_over_navigation() {
        let html = r#"<html><body>
            <div class="site-nav"><a href="/a">Markets</a> <a href="/b">Companies</a> <a href="/c">Earnings</a></div>
            <div id="story"><p>Acme Corp said on Tuesday that quarterly revenue rose sharply.</p>
            <p>The company raised its full-year guidance after strong demand.</p></div>
            <div class="links"><a href="/x">Related story one is here</a><a href="/y">Related story two is here</a></div>
        </body></html>"#;
        let text = DensityStrategy.extract(html, "https://news.example/a").unwrap();
        assert!(text.starts_with("Acme Corp said on Tuesday"));
        assert!(text.contains("full-year guidance"));
        assert!(!text.contains("Markets"));
    }

    fn boilerplate(html: &str) -> bool {
        let doc = Html::parse_fragment(html);
        let div = Selector::parse("div").unwrap();
        let el = doc.select(&div).next().unwrap();
        is_boilerplate_container(&el)
    }

    #[test]
    fn boilerplate_is_matched_on_whole_tokens() {
        assert!(boilerplate(r#"<div class="site-nav">x</div>"#));
        assert!(boilerplate(r#"<div id="cookie_consent">x</div>"#));
        assert!(boilerplate(r#"<div class="Promo box">x</div>"#));
        assert!(!boilerplate(r#"<div class="heads-up">x</div>"#));
        assert!(!boilerplate(r#"<div class="downloads">x</div>"#));
        assert!(!boilerplate(r#"<div class="menubar-free story">x</div>"#));
        assert!(!boilerplate(r#"<div>x</div>"#));
    }

    #[test]
    fn story_headers_are_not_boilerplate() {
        assert!(!boilerplate(r#"<div class="article-header">x</div>"#));
        assert!(boilerplate(r#"<div class="header">x</div>"#));
    }

    #[test]
    fn block_named_like_downloads_still_wins() {
        let html = r#"<html><body>
            <div class="menu"><a href="/a">Markets</a> <a href="/b">Companies</a></div>
            <div class="downloads"><p>Acme Corp published its annual report and the shares
            of the company rose after the filing showed higher cash flow.</p></div>
        </body></html>"#;
        let text = DensityStrategy.extract(html, "https://news.example/a").unwrap();
        assert!(text.contains("annual report"));
    }

    #[test]
    fn tiny_pages_yield_nothing() {
        assert!(DensityStrategy
            .extract("<div>too short</div>", "https://news.example/a")
            .is_none());
    }
}
