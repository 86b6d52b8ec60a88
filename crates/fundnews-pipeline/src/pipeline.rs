//! Per-item state machine and run orchestration.
//!
//! An item moves through the freshness and language gates, the dedup gate,
//! fetch + resolve + extraction, the relevance gate, sentiment labeling, and
//! finally the store. Every stage failure short of the store write is
//! recorded in the item's `fetch_status` instead of aborting the run.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt};
use fundnews_core::{
    normalize_published, AppConfig, CandidateItem, ExtractionMetadata, ExtractionResult,
    FeedConfig, FetchStatus, SentimentLabel,
};
use fundnews_scraper::{resolve_page, ExtractionCascade, HttpFetcher};
use fundnews_sentiment::{label_with_timeout, SentimentClassifier};
use tokio::sync::watch;
use tracing::Instrument;

use crate::dedup::DedupGate;
use crate::record::{build_record, sentiment_input};
use crate::relevance::{is_relevant, looks_like_target_language};
use crate::sources::fetch_candidates;
use crate::store::ArticleStore;

/// Why an item was dropped before anything was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    Duplicate,
    Irrelevant,
    StaleDate,
    NonTargetLanguage,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Duplicate => "duplicate",
            SkipReason::Irrelevant => "irrelevant",
            SkipReason::StaleDate => "stale-date",
            SkipReason::NonTargetLanguage => "non-target-language",
        }
    }
}

/// Terminal state of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    /// A record was written with this fetch outcome.
    Done(FetchStatus),
    Skipped(SkipReason),
    /// The store rejected the write.
    PersistFailed,
}

impl ItemOutcome {
    /// Summary key, e.g. `done:ok`, `skipped:duplicate`, `failed:persist`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            ItemOutcome::Done(status) => format!("done:{status}"),
            ItemOutcome::Skipped(reason) => format!("skipped:{}", reason.as_str()),
            ItemOutcome::PersistFailed => "failed:persist".to_string(),
        }
    }
}

/// Counts gathered over one or more feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub feeds_processed: usize,
    pub feeds_failed: usize,
    pub items_seen: usize,
    /// Item counts keyed by [`ItemOutcome::label`].
    pub outcomes: BTreeMap<String, usize>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.items_seen += 1;
        *self.outcomes.entry(outcome.label()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn count(&self, outcome: ItemOutcome) -> usize {
        self.outcomes.get(&outcome.label()).copied().unwrap_or(0)
    }

    /// Items that produced a stored record.
    #[must_use]
    pub fn stored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(label, _)| label.starts_with("done:"))
            .map(|(_, n)| n)
            .sum()
    }

    pub fn merge(&mut self, other: RunReport) {
        self.feeds_processed += other.feeds_processed;
        self.feeds_failed += other.feeds_failed;
        self.items_seen += other.items_seen;
        for (label, n) in other.outcomes {
            *self.outcomes.entry(label).or_insert(0) += n;
        }
        self.cancelled |= other.cancelled;
    }
}

/// Tunables for a run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub relevance_min_matches: usize,
    pub max_concurrent_items: usize,
    pub inter_feed_delay: Duration,
    pub sentiment_timeout: Duration,
    pub finnhub_api_key: Option<String>,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            relevance_min_matches: config.relevance_min_matches,
            max_concurrent_items: config.max_concurrent_items,
            inter_feed_delay: Duration::from_millis(config.inter_feed_delay_ms),
            sentiment_timeout: Duration::from_secs(config.sentiment_timeout_secs),
            finnhub_api_key: config.finnhub_api_key.clone(),
        }
    }
}

/// Everything a stage needs, passed explicitly.
pub struct PipelineContext {
    fetcher: HttpFetcher,
    cascade: Arc<ExtractionCascade>,
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<dyn ArticleStore>,
    dedup: DedupGate,
    settings: PipelineSettings,
}

impl PipelineContext {
    #[must_use]
    pub fn new(
        fetcher: HttpFetcher,
        cascade: Arc<ExtractionCascade>,
        classifier: Arc<dyn SentimentClassifier>,
        store: Arc<dyn ArticleStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher,
            cascade,
            classifier,
            store,
            dedup: DedupGate::new(),
            settings,
        }
    }

    #[must_use]
    pub fn dedup(&self) -> &DedupGate {
        &self.dedup
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("cascade", &self.cascade)
            .field("classifier", &self.classifier.name())
            .field("dedup_size", &self.dedup.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Fetch, resolve, and extract one URL.
///
/// Extraction is CPU-bound HTML work and runs on the blocking pool.
pub async fn fetch_and_extract(
    fetcher: &HttpFetcher,
    cascade: &Arc<ExtractionCascade>,
    url: &str,
) -> ExtractionResult {
    let page = resolve_page(fetcher, url).await;
    let resolved_url = page.url.clone();
    let http_status = page.http_status;
    let html_length = page.html.as_ref().map_or(0, String::len);

    let cascade = Arc::clone(cascade);
    match tokio::task::spawn_blocking(move || cascade.extract_page(&page)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(url, error = %e, "extraction task failed");
            ExtractionResult {
                text: None,
                status: FetchStatus::Error,
                error: Some(format!("extract task: {e}")),
                http_status,
                metadata: ExtractionMetadata {
                    resolved_url,
                    strategy_used: None,
                    html_length,
                },
            }
        }
    }
}

/// Whether `published` falls inside `[midnight UTC of now - max_age_days, now]`.
///
/// A window reaching past the earliest representable time starts there.
#[must_use]
pub fn within_freshness_window(
    published: DateTime<Utc>,
    max_age_days: u32,
    now: DateTime<Utc>,
) -> bool {
    let start = TimeDelta::try_days(i64::from(max_age_days))
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc());
    start.is_some_and(|start| published >= start && published <= now)
}

fn gate_skip(feed: &FeedConfig, item: &CandidateItem, now: DateTime<Utc>) -> Option<SkipReason> {
    if let Some(days) = feed.max_age_days {
        let fresh = item
            .published_raw
            .as_ref()
            .and_then(normalize_published)
            .is_some_and(|published| within_freshness_window(published, days, now));
        if !fresh {
            return Some(SkipReason::StaleDate);
        }
    }

    if feed.language_check {
        let sample = format!("{} {}", item.headline, item.summary);
        if !looks_like_target_language(&sample) {
            return Some(SkipReason::NonTargetLanguage);
        }
    }

    None
}

/// Run one candidate from `feed` through every stage.
pub async fn process_item(
    ctx: &PipelineContext,
    feed: &FeedConfig,
    item: &CandidateItem,
    now: DateTime<Utc>,
) -> ItemOutcome {
    if let Some(reason) = gate_skip(feed, item, now) {
        tracing::debug!(url = %item.url, reason = reason.as_str(), "item skipped");
        return ItemOutcome::Skipped(reason);
    }

    if !ctx.dedup.check_and_mark(&item.item_id) {
        tracing::debug!(url = %item.url, item_id = %item.item_id, "duplicate item skipped");
        return ItemOutcome::Skipped(SkipReason::Duplicate);
    }

    let result = fetch_and_extract(&ctx.fetcher, &ctx.cascade, &item.url).await;

    if feed.needs_filtering
        && !is_relevant(
            &item.headline,
            &item.summary,
            result.text.as_deref().unwrap_or_default(),
            ctx.settings.relevance_min_matches,
        )
    {
        tracing::debug!(url = %item.url, "irrelevant item skipped");
        return ItemOutcome::Skipped(SkipReason::Irrelevant);
    }

    label_and_store(ctx, item, &result).await
}

/// Re-run fetch, extraction, labeling, and the write for an item that is
/// already stored. Gates are not applied.
pub async fn reprocess(ctx: &PipelineContext, item: &CandidateItem) -> ItemOutcome {
    let result = fetch_and_extract(&ctx.fetcher, &ctx.cascade, &item.url).await;
    label_and_store(ctx, item, &result).await
}

async fn label_and_store(
    ctx: &PipelineContext,
    item: &CandidateItem,
    result: &ExtractionResult,
) -> ItemOutcome {
    let label = label_with_timeout(
        ctx.classifier.as_ref(),
        sentiment_input(item),
        ctx.settings.sentiment_timeout,
    )
    .await;

    let record = build_record(item, result, label, Utc::now());
    match ctx.store.upsert(&record).await {
        Ok(()) => {
            tracing::info!(
                url = %item.url,
                fetch_status = %record.fetch_status,
                sentiment = record.sentiment_label.map_or("none", SentimentLabel::as_str),
                "article stored"
            );
            ItemOutcome::Done(result.status)
        }
        Err(e) => {
            tracing::error!(url = %item.url, error = %e, "article write failed");
            ItemOutcome::PersistFailed
        }
    }
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow()
}

/// Process a feed's items with bounded parallelism.
///
/// Cancellation is checked before each item starts; items already in flight
/// finish.
pub async fn run_items(
    ctx: &PipelineContext,
    feed: &FeedConfig,
    items: &[CandidateItem],
    cancel: &watch::Receiver<bool>,
) -> RunReport {
    let now = Utc::now();
    let outcomes: Vec<Option<ItemOutcome>> = stream::iter(items)
        .map(|item| async move {
            if is_cancelled(cancel) {
                return None;
            }
            Some(process_item(ctx, feed, item, now).await)
        })
        .buffer_unordered(ctx.settings.max_concurrent_items.max(1))
        .collect()
        .await;

    tally(outcomes)
}

/// `None` marks an item that was never started because the run was cancelled.
fn tally(outcomes: Vec<Option<ItemOutcome>>) -> RunReport {
    let mut report = RunReport::default();
    for outcome in outcomes {
        match outcome {
            Some(outcome) => report.record(outcome),
            None => report.cancelled = true,
        }
    }
    report
}

/// Fetch one feed and process its items.
pub async fn run_feed(
    ctx: &PipelineContext,
    feed: &FeedConfig,
    cancel: &watch::Receiver<bool>,
) -> RunReport {
    let span = tracing::info_span!("feed", feed = %feed.name);
    async {
        let items = match fetch_candidates(
            &ctx.fetcher,
            feed,
            ctx.settings.finnhub_api_key.as_deref(),
        )
        .await
        {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "feed fetch failed");
                return RunReport {
                    feeds_failed: 1,
                    ..RunReport::default()
                };
            }
        };

        let mut report = run_items(ctx, feed, &items, cancel).await;
        report.feeds_processed = 1;
        tracing::info!(
            items = report.items_seen,
            stored = report.stored(),
            "feed complete"
        );
        report
    }
    .instrument(span)
    .await
}

/// Drain every feed once, in order, pausing between feeds.
pub async fn run_all(
    ctx: &PipelineContext,
    feeds: &[&FeedConfig],
    cancel: &watch::Receiver<bool>,
) -> RunReport {
    let mut report = RunReport::default();
    for (index, feed) in feeds.iter().enumerate() {
        if index > 0 {
            pause(ctx.settings.inter_feed_delay, cancel).await;
        }
        if is_cancelled(cancel) {
            tracing::warn!(remaining = feeds.len() - index, "run cancelled");
            report.cancelled = true;
            break;
        }
        report.merge(run_feed(ctx, feed, cancel).await);
    }
    report
}

/// Re-process stored items with bounded parallelism.
pub async fn run_refetch(
    ctx: &PipelineContext,
    items: &[CandidateItem],
    cancel: &watch::Receiver<bool>,
) -> RunReport {
    let outcomes: Vec<Option<ItemOutcome>> = stream::iter(items)
        .map(|item| async move {
            if is_cancelled(cancel) {
                return None;
            }
            Some(reprocess(ctx, item).await)
        })
        .buffer_unordered(ctx.settings.max_concurrent_items.max(1))
        .collect()
        .await;

    tally(outcomes)
}

/// Sleep for `delay`, waking early if the run is cancelled.
async fn pause(delay: Duration, cancel: &watch::Receiver<bool>) {
    if delay.is_zero() {
        return;
    }
    let deadline = tokio::time::Instant::now() + delay;
    let mut cancel = cancel.clone();
    tokio::select! {
        () = tokio::time::sleep_until(deadline) => {}
        sender_gone = async { cancel.wait_for(|c| *c).await.is_err() } => {
            if sender_gone {
                tokio::time::sleep_until(deadline).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
