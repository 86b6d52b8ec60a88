pub mod error;
pub mod extract;
pub mod fetch;
pub mod resolve;
pub(crate) mod retry;

pub use error::FetchError;
pub use extract::{ExtractionCascade, ExtractionStrategy};
pub use fetch::{FetchOutcome, HttpFetcher, TextRequest, ACCEPT_FEED, ACCEPT_JSON};
pub use resolve::{resolve_page, ResolvedPage};
