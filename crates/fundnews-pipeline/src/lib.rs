//! News ingestion: feed sources, relevance and dedup gates, and the per-item
//! fetch → extract → label → store pipeline.

pub mod dedup;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod relevance;
pub mod sources;
pub mod store;

pub use dedup::{item_id, DedupGate};
pub use error::PipelineError;
pub use pipeline::{
    fetch_and_extract, process_item, reprocess, run_all, run_feed, run_items, run_refetch,
    ItemOutcome, PipelineContext, PipelineSettings, RunReport, SkipReason,
};
pub use record::{build_record, candidate_from_row, source_domain};
pub use relevance::{is_relevant, looks_like_target_language};
pub use sources::fetch_candidates;
pub use store::{ArticleStore, MemoryArticleStore, PgArticleStore};
