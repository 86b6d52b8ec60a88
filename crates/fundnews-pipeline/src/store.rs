//! Where processed records are written.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use fundnews_core::ArticleRecord;
use sqlx::PgPool;

use crate::error::PipelineError;

/// Insert-or-replace keyed on `record.url`.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn upsert(&self, record: &ArticleRecord) -> Result<(), PipelineError>;
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn upsert(&self, record: &ArticleRecord) -> Result<(), PipelineError> {
        let id = fundnews_db::upsert_article(&self.pool, record).await?;
        tracing::debug!(id, url = %record.url, fetch_status = %record.fetch_status, "article upserted");
        Ok(())
    }
}

/// In-memory store used for `--dry-run` and tests.
///
/// Keeps the latest record per URL plus a count of every write.
#[derive(Debug, Default)]
pub struct MemoryArticleStore {
    records: Mutex<HashMap<String, ArticleRecord>>,
    writes: Mutex<usize>,
}

impl MemoryArticleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<ArticleRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Stored records ordered by URL.
    #[must_use]
    pub fn records(&self) -> Vec<ArticleRecord> {
        let mut records: Vec<ArticleRecord> = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| a.url.cmp(&b.url));
        records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total `upsert` calls, including overwrites.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn upsert(&self, record: &ArticleRecord) -> Result<(), PipelineError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.url.clone(), record.clone());
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
