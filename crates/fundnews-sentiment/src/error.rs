use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference endpoint returned status {status}: {body}")]
    Endpoint { status: u16, body: String },

    #[error("unexpected inference response: {0}")]
    Response(String),

    #[error("sentiment configuration error: {0}")]
    Config(String),
}
