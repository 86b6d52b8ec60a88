use scraper::{Html, Selector};

use super::text::collapse_whitespace;
use super::ExtractionStrategy;

/// Paragraphs of the first `<article>`, falling back to `[role=article]`
/// and then `<main>`. Paragraphs are separated by a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleTagStrategy;

impl ExtractionStrategy for ArticleTagStrategy {
    fn name(&self) -> &'static str {
        "article-tag"
    }

    fn extract(&self, html: &str, _url: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let para_sel = Selector::parse("p").ok()?;

        let article = ["article", "[role=article]", "main"]
            .into_iter()
            .filter_map(|css| Selector::parse(css).ok())
            .find_map(|sel| doc.select(&sel).next())?;
        let paragraphs: Vec<String> = article
            .select(&para_sel)
            .map(|p| collapse_whitespace(&p.text().collect::<String>()))
            .filter(|p| !p.is_empty())
            .collect();

        (!paragraphs.is_empty()).then(|| paragraphs.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_article_paragraphs() {
        let html = "<body><p>outside</p><article><h1>Title</h1><p>First  para.</p><p></p><p>Second <em>para</em>.</p></article></body>";
        let text = ArticleTagStrategy.extract(html, "https://news.example/a");
        assert_eq!(text.as_deref(), Some("First para.\n\nSecond para."));
    }

    #[test]
    fn falls_back_to_role_article_then_main() {
        let role = r#"<div role="article"><p>Role based.</p></div><main><p>Main.</p></main>"#;
        assert_eq!(
            ArticleTagStrategy.extract(role, "https://news.example/a").as_deref(),
            Some("Role based.")
        );
        let main = "<main><p>Only main.</p></main>";
        assert_eq!(
            ArticleTagStrategy.extract(main, "https://news.example/a").as_deref(),
            Some("Only main.")
        );
    }

    #[test]
    fn missing_article_yields_none() {
        assert!(ArticleTagStrategy
            .extract("<p>just a paragraph</p>", "https://news.example/a")
            .is_none());
    }
}
