use crate::app_config::{AppConfig, Environment, SentimentMode};
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_SENTIMENT_URL: &str =
    "https://api-inference.huggingface.co/models/ProsusAI/finbert";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("FUNDNEWS_ENV", "development"))?;
    let log_level = or_default("FUNDNEWS_LOG_LEVEL", "info");
    let feeds_path = PathBuf::from(or_default("FUNDNEWS_FEEDS_PATH", "./config/feeds.yaml"));

    let db_max_connections = parse_u32("FUNDNEWS_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("FUNDNEWS_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("FUNDNEWS_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("FUNDNEWS_FETCH_TIMEOUT_SECS", "10")?;
    let fetch_user_agent = or_default("FUNDNEWS_FETCH_USER_AGENT", DEFAULT_USER_AGENT);
    let fetch_max_retries = parse_u32("FUNDNEWS_FETCH_MAX_RETRIES", "2")?;
    let fetch_backoff_base_ms = parse_u64("FUNDNEWS_FETCH_BACKOFF_BASE_MS", "600")?;

    let min_words = parse_usize("FUNDNEWS_MIN_WORDS", "150")?;
    let relevance_min_matches = parse_usize("FUNDNEWS_RELEVANCE_MIN_MATCHES", "1")?;
    let max_concurrent_items = parse_usize("FUNDNEWS_MAX_CONCURRENT_ITEMS", "4")?;
    let inter_feed_delay_ms = parse_u64("FUNDNEWS_INTER_FEED_DELAY_MS", "2000")?;

    let sentiment_mode = parse_sentiment_mode(&or_default("FUNDNEWS_SENTIMENT_MODE", "lexicon"))?;
    let sentiment_url = or_default("FUNDNEWS_SENTIMENT_URL", DEFAULT_SENTIMENT_URL);
    let sentiment_api_key = optional("FUNDNEWS_SENTIMENT_API_KEY");
    let sentiment_timeout_secs = parse_u64("FUNDNEWS_SENTIMENT_TIMEOUT_SECS", "15")?;
    let finnhub_api_key = optional("FINNHUB_API_KEY");

    if sentiment_mode == SentimentMode::Remote && sentiment_api_key.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "FUNDNEWS_SENTIMENT_API_KEY".to_string(),
        ));
    }

    if min_words == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FUNDNEWS_MIN_WORDS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        feeds_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        fetch_user_agent,
        fetch_max_retries,
        fetch_backoff_base_ms,
        min_words,
        relevance_min_matches,
        max_concurrent_items,
        inter_feed_delay_ms,
        sentiment_mode,
        sentiment_url,
        sentiment_api_key,
        sentiment_timeout_secs,
        finnhub_api_key,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FUNDNEWS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_sentiment_mode(s: &str) -> Result<SentimentMode, ConfigError> {
    match s {
        "remote" => Ok(SentimentMode::Remote),
        "lexicon" => Ok(SentimentMode::Lexicon),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FUNDNEWS_SENTIMENT_MODE".to_string(),
            reason: format!("expected 'remote' or 'lexicon', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
