//! Sentiment labeling for ingested articles.
//!
//! The pipeline talks to a [`SentimentClassifier`] trait object. Two adapters
//! ship with the crate: a hosted FinBERT-style inference endpoint and an
//! in-process finance lexicon used when no endpoint is configured.

pub mod classifier;
pub mod error;
pub mod lexicon;
pub mod remote;

pub use classifier::{build_classifier, label_with_timeout, SentimentClassifier};
pub use error::SentimentError;
pub use lexicon::{lexicon_score, LexiconClassifier};
pub use remote::RemoteClassifier;
