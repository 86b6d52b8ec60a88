//! Database operations for the `articles` table.

use chrono::{DateTime, Utc};
use fundnews_core::ArticleRecord;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `articles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub url: String,
    pub item_id: String,
    pub headline: String,
    pub summary: String,
    pub full_text: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source: String,
    pub source_domain: Option<String>,
    pub category: Option<String>,
    pub related: Option<String>,
    pub sentiment_label: Option<String>,
    pub resolved_url: String,
    pub fetch_status: String,
    pub fetch_error: Option<String>,
    pub inserted_at: DateTime<Utc>,
}

impl ArticleRow {
    /// Outcome prefix of `fetch_status`, e.g. `"ok"` from `"ok:200|readability|html=5120"`.
    #[must_use]
    pub fn outcome(&self) -> &str {
        self.fetch_status
            .split_once(':')
            .map_or(self.fetch_status.as_str(), |(outcome, _)| outcome)
    }
}

const ARTICLE_COLUMNS: &str = "id, url, item_id, headline, summary, full_text, published_at, \
     source, source_domain, category, related, sentiment_label, resolved_url, \
     fetch_status, fetch_error, inserted_at";

/// Insert an article or replace every field of the row with the same `url`.
///
/// Returns the row id, which is stable across re-ingestion of the same URL.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_article(pool: &PgPool, record: &ArticleRecord) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO articles \
             (url, item_id, headline, summary, full_text, published_at, source, \
              source_domain, category, related, sentiment_label, resolved_url, \
              fetch_status, fetch_error, inserted_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, \
                 $8, $9, $10, $11, $12, \
                 $13, $14, $15) \
         ON CONFLICT (url) DO UPDATE SET \
             item_id         = EXCLUDED.item_id, \
             headline        = EXCLUDED.headline, \
             summary         = EXCLUDED.summary, \
             full_text       = EXCLUDED.full_text, \
             published_at    = EXCLUDED.published_at, \
             source          = EXCLUDED.source, \
             source_domain   = EXCLUDED.source_domain, \
             category        = EXCLUDED.category, \
             related         = EXCLUDED.related, \
             sentiment_label = EXCLUDED.sentiment_label, \
             resolved_url    = EXCLUDED.resolved_url, \
             fetch_status    = EXCLUDED.fetch_status, \
             fetch_error     = EXCLUDED.fetch_error, \
             inserted_at     = EXCLUDED.inserted_at \
         RETURNING id",
    )
    .bind(&record.url)
    .bind(&record.item_id)
    .bind(&record.headline)
    .bind(&record.summary)
    .bind(&record.full_text)
    .bind(record.published_at)
    .bind(&record.source)
    .bind(&record.source_domain)
    .bind(&record.category)
    .bind(&record.related)
    .bind(record.sentiment_label.map(|l| l.as_str()))
    .bind(&record.resolved_url)
    .bind(&record.fetch_status)
    .bind(&record.fetch_error)
    .bind(record.inserted_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Most recently written articles, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_articles(pool: &PgPool, limit: i64) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles \
         ORDER BY inserted_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Fetch one article by its conflict key.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has this `url`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_article_by_url(pool: &PgPool, url: &str) -> Result<ArticleRow, DbError> {
    sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles WHERE url = $1"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Row counts grouped by the outcome prefix of `fetch_status`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_articles_by_status(pool: &PgPool) -> Result<Vec<(String, i64)>, DbError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT split_part(fetch_status, ':', 1) AS outcome, COUNT(*) AS n \
         FROM articles \
         GROUP BY outcome \
         ORDER BY n DESC, outcome",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stored-row health summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ArticleStats {
    pub total: i64,
    pub empty_full_text: i64,
}

/// Count all rows and rows whose `full_text` is null or blank.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn article_stats(pool: &PgPool) -> Result<ArticleStats, DbError> {
    let stats = sqlx::query_as::<_, ArticleStats>(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE full_text IS NULL OR btrim(full_text) = '') \
                    AS empty_full_text \
         FROM articles",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Rows worth another fetch: failed, blocked, or empty outcomes, or no text.
///
/// Oldest writes come first so repeated runs make progress through the
/// backlog.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_refetch_candidates(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ArticleRow>, DbError> {
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles \
         WHERE split_part(fetch_status, ':', 1) IN ('error', 'blocked', 'empty') \
            OR full_text IS NULL OR btrim(full_text) = '' \
         ORDER BY inserted_at ASC, id ASC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Articles published since `since` that mention `term` in the headline,
/// summary, full text, or related field. Newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_articles(
    pool: &PgPool,
    term: &str,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<ArticleRow>, DbError> {
    let pattern = format!("%{}%", escape_like(term));
    let rows = sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_COLUMNS} FROM articles \
         WHERE published_at >= $1 \
           AND (headline ILIKE $2 OR summary ILIKE $2 \
                OR full_text ILIKE $2 OR related ILIKE $2) \
         ORDER BY published_at DESC, id DESC \
         LIMIT $3"
    ))
    .bind(since)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
