use reqwest::Url;
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};

use super::ExtractionStrategy;

/// Mozilla Readability port, rendered as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityStrategy;

impl ExtractionStrategy for ReadabilityStrategy {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn extract(&self, html: &str, url: &str) -> Option<String> {
        let parsed_url = Url::parse(url).ok();
        let config = TransformConfig {
            readability: true,
            main_content: true,
            return_format: ReturnFormat::Text,
            filter_images: true,
            filter_svg: true,
            clean_html: true,
        };
        let input = TransformInput {
            url: parsed_url.as_ref(),
            content: html.as_bytes(),
            screenshot_bytes: None,
            encoding: None,
            selector_config: None,
            ignore_tags: None,
        };

        let text = transform_content_input(input, &config);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
