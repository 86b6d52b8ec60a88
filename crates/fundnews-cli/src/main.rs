mod ingest;
mod query;

use clap::{Parser, Subcommand};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fundnews")]
#[command(about = "Financial news ingestion: fetch, extract, label, store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Drain every enabled feed once
    Ingest {
        /// Restrict the run to one feed (by name, case-insensitive)
        #[arg(long)]
        feed: Option<String>,

        /// Process items but keep records in memory instead of the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Fetch, resolve, and extract a single URL and print the result
    Extract { url: String },
    /// Apply pending database migrations
    Migrate,
    /// Show stored-row health and the latest articles
    Status {
        /// Maximum number of articles to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Re-fetch stored articles whose extraction failed or came back empty
    Refetch {
        /// Maximum number of articles to re-fetch
        #[arg(long, default_value = "100")]
        limit: i64,
    },
    /// Search recent articles by keyword or ticker
    Search {
        term: String,
        /// Look back this many hours
        #[arg(long, default_value = "24")]
        hours: i64,
        /// Maximum number of articles to show
        #[arg(long, default_value = "50")]
        limit: i64,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ingest { .. } => "ingest",
            Commands::Extract { .. } => "extract",
            Commands::Migrate => "migrate",
            Commands::Status { .. } => "status",
            Commands::Refetch { .. } => "refetch",
            Commands::Search { .. } => "search",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = fundnews_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let run_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("run", %run_id, command = cli.command.name());
    dispatch(cli.command, &config).instrument(span).await
}

async fn dispatch(command: Commands, config: &fundnews_core::AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Ingest { feed, dry_run } => {
            ingest::run_ingest(config, feed.as_deref(), dry_run).await
        }
        Commands::Extract { url } => ingest::run_extract(config, &url).await,
        Commands::Migrate => {
            let pool = connect(config).await?;
            let applied = fundnews_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Status { limit } => {
            let pool = connect(config).await?;
            query::run_status(&pool, limit).await
        }
        Commands::Refetch { limit } => {
            let pool = connect(config).await?;
            ingest::run_refetch(&pool, config, limit).await
        }
        Commands::Search { term, hours, limit } => {
            let pool = connect(config).await?;
            query::run_search(&pool, &term, hours, limit).await
        }
    }
}

/// Connect using `DATABASE_URL`, failing fast when it is unset.
pub(crate) async fn connect(config: &fundnews_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let database_url = config.require_database_url()?;
    let pool_config = fundnews_db::PoolConfig::from_app_config(config);
    let pool = fundnews_db::connect_pool(database_url, pool_config).await?;
    Ok(pool)
}
