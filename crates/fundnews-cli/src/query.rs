//! Read-only command handlers: `status` and `search`.

use chrono::{DateTime, TimeDelta, Utc};
use fundnews_db::ArticleRow;

fn fmt_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

/// Start of a look-back of `hours` from `now`. Negative values count as zero.
fn search_since(now: DateTime<Utc>, hours: i64) -> anyhow::Result<DateTime<Utc>> {
    TimeDelta::try_hours(hours.max(0))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| anyhow::anyhow!("--hours {hours} reaches past the earliest supported date"))
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        format!("{}...", value.chars().take(max_chars).collect::<String>())
    } else {
        value.to_string()
    }
}

fn print_articles(rows: &[ArticleRow]) {
    println!(
        "{:<18}{:<10}{:<10}{:<20}HEADLINE",
        "PUBLISHED", "OUTCOME", "LABEL", "SOURCE"
    );
    for row in rows {
        println!(
            "{:<18}{:<10}{:<10}{:<20}{}",
            fmt_time(row.published_at),
            row.outcome(),
            row.sentiment_label.as_deref().unwrap_or("-"),
            truncate(&row.source, 18),
            truncate(&row.headline, 60)
        );
    }
}

/// Print row totals, counts per fetch outcome, and the latest articles.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub(crate) async fn run_status(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let stats = fundnews_db::article_stats(pool).await?;
    println!(
        "articles: {} total, {} with empty full_text",
        stats.total, stats.empty_full_text
    );
    if stats.total == 0 {
        println!("no articles stored yet; run `fundnews ingest` first");
        return Ok(());
    }

    for (outcome, count) in fundnews_db::count_articles_by_status(pool).await? {
        println!("  {outcome:<10}{count:>8}");
    }
    println!();

    let rows = fundnews_db::list_recent_articles(pool, limit).await?;
    print_articles(&rows);
    Ok(())
}

/// Print articles from the last `hours` hours mentioning `term`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_search(
    pool: &sqlx::PgPool,
    term: &str,
    hours: i64,
    limit: i64,
) -> anyhow::Result<()> {
    let since = search_since(Utc::now(), hours)?;
    let rows = fundnews_db::search_articles(pool, term, since, limit).await?;
    if rows.is_empty() {
        println!("no articles mention '{term}' in the last {hours} hour(s)");
        return Ok(());
    }
    print_articles(&rows);
    Ok(())
}
