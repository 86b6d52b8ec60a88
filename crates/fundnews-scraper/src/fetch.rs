//! Browser-like HTTP GET with bounded retry.

use std::time::Duration;

use fundnews_core::AppConfig;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, RequestBuilder};

use crate::error::{strip_query, FetchError};
use crate::retry::{retry_with_backoff, RETRIABLE_STATUSES};

pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const ACCEPT_FEED: &str =
    "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.5";
pub const ACCEPT_JSON: &str = "application/json";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";

/// Per-request headers for [`HttpFetcher::get_text`].
#[derive(Clone, Copy, Default)]
pub struct TextRequest<'a> {
    /// `Accept` value; the HTML page default when `None`.
    pub accept: Option<&'a str>,
    /// Overrides the client's `User-Agent`.
    pub user_agent: Option<&'a str>,
    /// Credential header `(name, value)`. Never logged.
    pub secret_header: Option<(&'static str, &'a str)>,
}

impl std::fmt::Debug for TextRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRequest")
            .field("accept", &self.accept)
            .field("user_agent", &self.user_agent)
            .field("secret_header", &self.secret_header.map(|(name, _)| (name, "[redacted]")))
            .finish()
    }
}

/// Result of a single page fetch. Never an `Err`: failures are data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Final HTTP status, or `None` if no response was received.
    pub status: Option<u16>,
    /// Body text, present only for a successful response.
    pub body: Option<String>,
    pub error: Option<String>,
}

impl FetchOutcome {
    fn failed(status: Option<u16>, error: String) -> Self {
        Self {
            status,
            body: None,
            error: Some(error),
        }
    }
}

/// HTTP client used for article pages and feed payloads.
///
/// Sends a desktop-browser `User-Agent` plus `Accept`/`Accept-Language`
/// headers, follows redirects, and retries 429/5xx and network failures with
/// exponential back-off.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Build a fetcher from the `FUNDNEWS_FETCH_*` settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(
            config.fetch_timeout_secs,
            &config.fetch_user_agent,
            config.fetch_max_retries,
            config.fetch_backoff_base_ms,
        )
    }

    /// Fetch a page and report what happened.
    ///
    /// A non-success status that is not retried yields that status with no
    /// body. When retries run out, the last status seen is kept.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            self.attempt(url).await
        })
        .await;

        match result {
            Ok((status, Some(body))) => FetchOutcome {
                status: Some(status),
                body: Some(body),
                error: None,
            },
            Ok((status, None)) => FetchOutcome::failed(Some(status), format!("http {status}")),
            Err(err) => {
                tracing::debug!(url, error = %err, "page fetch failed");
                FetchOutcome::failed(err.status(), err.to_string())
            }
        }
    }

    /// Fetch a feed or API payload as text, treating any non-success status
    /// as an error.
    ///
    /// Errors never carry the request URL's query string, which is where
    /// feed APIs tend to put credentials.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] on network failure or a non-2xx status,
    /// or [`FetchError::RetriableStatus`] if retries were exhausted.
    pub async fn get_text(&self, url: &str, options: TextRequest<'_>) -> Result<String, FetchError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let mut request = self
                .client
                .get(url)
                .header(ACCEPT, options.accept.unwrap_or(ACCEPT_HTML))
                .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_EN);
            if let Some(ua) = options.user_agent {
                request = request.header(USER_AGENT, ua);
            }
            if let Some((name, value)) = options.secret_header {
                request = request.header(name, value);
            }
            let response = send(request, url).await?;
            let response = response.error_for_status()?;
            Ok(response.text().await?)
        })
        .await
        .map_err(FetchError::without_url)
    }

    async fn attempt(&self, url: &str) -> Result<(u16, Option<String>), FetchError> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_EN);
        let response = send(request, url).await?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok((status, None));
        }
        let body = response.text().await?;
        Ok((status, Some(body)))
    }
}

/// Send `request`, turning throttling and gateway statuses into
/// [`FetchError::RetriableStatus`].
async fn send(
    request: RequestBuilder,
    url: &str,
) -> Result<reqwest::Response, FetchError> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    if RETRIABLE_STATUSES.contains(&status) {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(FetchError::RetriableStatus {
            status,
            url: strip_query(url),
            retry_after,
        });
    }
    Ok(response)
}
