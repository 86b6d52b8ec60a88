//! Ingestion command handlers: `ingest`, `extract`, and `refetch`.
//!
//! Per-item failures are recorded in each article's `fetch_status` and never
//! abort a run. Only startup problems (missing credentials, unreadable feed
//! catalog, unreachable database) are returned as errors.

use std::sync::Arc;

use anyhow::Context;
use fundnews_core::{AppConfig, FeedKind};
use fundnews_pipeline::{
    candidate_from_row, run_all, run_refetch as refetch_items, ArticleStore,
    MemoryArticleStore, PgArticleStore, PipelineContext, PipelineSettings, RunReport,
};
use fundnews_scraper::{ExtractionCascade, HttpFetcher};
use tokio::sync::watch;

/// Cancellation flag flipped by Ctrl-C.
fn cancel_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received ctrl-c, finishing in-flight items");
            let _ = tx.send(true);
        }
    });
    rx
}

fn build_context(
    config: &AppConfig,
    store: Arc<dyn ArticleStore>,
) -> anyhow::Result<PipelineContext> {
    let classifier = fundnews_sentiment::build_classifier(config)
        .context("failed to build sentiment classifier")?;
    let fetcher = HttpFetcher::from_config(config).context("failed to build HTTP client")?;
    let cascade = Arc::new(ExtractionCascade::new(config.min_words));
    Ok(PipelineContext::new(
        fetcher,
        cascade,
        classifier,
        store,
        PipelineSettings::from_app_config(config),
    ))
}

/// Drain the enabled feeds once.
///
/// With `dry_run` the records are kept in memory and only summarized.
///
/// # Errors
///
/// Returns an error if the feed catalog cannot be loaded, the feed filter
/// matches nothing, a required credential is missing, or the database is
/// unreachable.
pub(crate) async fn run_ingest(
    config: &AppConfig,
    feed_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let catalog = fundnews_core::load_feeds(&config.feeds_path)?;
    let feeds = catalog.enabled(feed_filter);
    if feeds.is_empty() {
        match feed_filter {
            Some(name) => anyhow::bail!(
                "feed '{name}' not found or disabled in {}",
                config.feeds_path.display()
            ),
            None => {
                println!(
                    "no enabled feeds in {}; nothing to do",
                    config.feeds_path.display()
                );
                return Ok(());
            }
        }
    }

    if feeds.iter().any(|f| f.kind == FeedKind::Finnhub) {
        config.require_finnhub_api_key()?;
    }

    let memory = Arc::new(MemoryArticleStore::new());
    let store: Arc<dyn ArticleStore> = if dry_run {
        memory.clone()
    } else {
        Arc::new(PgArticleStore::new(crate::connect(config).await?))
    };
    let ctx = build_context(config, store)?;

    let names: Vec<&str> = feeds.iter().map(|f| f.name.as_str()).collect();
    tracing::info!(feeds = ?names, dry_run, "ingest started");

    let cancel = cancel_on_ctrl_c();
    let report = run_all(&ctx, &feeds, &cancel).await;
    print_report(&report);

    if dry_run {
        println!("dry-run: {} record(s) kept in memory, nothing written", memory.len());
        for record in memory.records() {
            println!("  {:<40} {}", record.fetch_status, record.url);
        }
    }
    Ok(())
}

/// Re-run fetch and extraction for stored rows that failed or have no text.
///
/// # Errors
///
/// Returns an error if the candidates cannot be loaded or a required
/// credential is missing.
pub(crate) async fn run_refetch(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    limit: i64,
) -> anyhow::Result<()> {
    let rows = fundnews_db::list_refetch_candidates(pool, limit).await?;
    if rows.is_empty() {
        println!("no articles need a re-fetch");
        return Ok(());
    }
    let items: Vec<_> = rows.iter().map(candidate_from_row).collect();

    let ctx = build_context(config, Arc::new(PgArticleStore::new(pool.clone())))?;
    tracing::info!(count = items.len(), "refetch started");

    let cancel = cancel_on_ctrl_c();
    let report = refetch_items(&ctx, &items, &cancel).await;
    print_report(&report);
    Ok(())
}

/// Resolve and extract one URL without storing anything.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub(crate) async fn run_extract(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::from_config(config).context("failed to build HTTP client")?;
    let cascade = Arc::new(ExtractionCascade::new(config.min_words));

    let result = fundnews_pipeline::fetch_and_extract(&fetcher, &cascade, url).await;

    println!("url:          {url}");
    println!("resolved_url: {}", result.metadata.resolved_url);
    println!("fetch_status: {}", result.diagnostic());
    if let Some(error) = &result.error {
        println!("error:        {error}");
    }
    if let Some(text) = &result.text {
        println!("words:        {}", fundnews_scraper::extract::word_count(text));
        println!();
        println!("{}", preview(text, 1_000));
    }
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn print_report(report: &RunReport) {
    println!(
        "feeds: {} processed, {} failed; items: {} seen, {} stored{}",
        report.feeds_processed,
        report.feeds_failed,
        report.items_seen,
        report.stored(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
    for (outcome, count) in &report.outcomes {
        println!("  {outcome:<30}{count:>6}");
    }
}
