use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Throttling or gateway status that is worth another attempt.
    ///
    /// `url` has its query string removed, since feed APIs may carry
    /// credentials there.
    #[error("retriable HTTP status {status} from {url}")]
    RetriableStatus {
        status: u16,
        url: String,
        /// Server-requested wait from a `Retry-After: <seconds>` header.
        retry_after: Option<Duration>,
    },
}

impl FetchError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            FetchError::RetriableStatus { status, .. } => Some(*status),
        }
    }

    /// Drop the request URL from a transport error so it cannot reach logs.
    #[must_use]
    pub fn without_url(self) -> Self {
        match self {
            FetchError::Http(e) => FetchError::Http(e.without_url()),
            other => other,
        }
    }
}

/// `url` without its query string or fragment.
#[must_use]
pub fn strip_query(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_query_drops_parameters_and_fragment() {
        assert_eq!(
            strip_query("https://api.example/v1/news?category=general&token=abc"),
            "https://api.example/v1/news"
        );
        assert_eq!(strip_query("https://news.example/a#top"), "https://news.example/a");
        assert_eq!(strip_query("https://news.example/a"), "https://news.example/a");
    }
}
