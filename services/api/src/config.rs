//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Per-surface credentials are optional:
//! a missing credential disables that surface rather than failing startup.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials for the web-search surface. Both halves are required for the
/// surface to be enabled.
#[derive(Clone, Debug)]
pub struct WebSearchCredentials {
    pub api_key: String,
    pub engine_id: String,
}

/// Credentials for the forum-search surface (client-credentials flow).
#[derive(Clone, Debug)]
pub struct ForumSearchCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub web_search: Option<WebSearchCredentials>,
    pub news_api_key: Option<String>,
    pub forum_search: Option<ForumSearchCredentials>,
    pub openai_api_key: Option<String>,
    pub summary_model: String,
    pub max_citations_per_run: usize,
    pub query_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Surface Credentials (all optional) ---
        let web_search = match (
            std::env::var("GOOGLE_SEARCH_API_KEY").ok(),
            std::env::var("GOOGLE_SEARCH_ENGINE_ID").ok(),
        ) {
            (Some(api_key), Some(engine_id)) => Some(WebSearchCredentials { api_key, engine_id }),
            _ => None,
        };

        let news_api_key = std::env::var("NEWS_API_KEY").ok();

        let forum_search = match (
            std::env::var("REDDIT_CLIENT_ID").ok(),
            std::env::var("REDDIT_CLIENT_SECRET").ok(),
        ) {
            (Some(client_id), Some(client_secret)) => Some(ForumSearchCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Pipeline Tunables ---
        let summary_model =
            std::env::var("SUMMARY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let max_citations_per_run = match std::env::var("MAX_CITATIONS_PER_RUN") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(
                    "MAX_CITATIONS_PER_RUN".to_string(),
                    format!("'{}' is not a valid count", raw),
                )
            })?,
            Err(_) => 3,
        };

        let query_delay_ms = match std::env::var("QUERY_DELAY_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "QUERY_DELAY_MS".to_string(),
                    format!("'{}' is not a valid delay", raw),
                )
            })?,
            Err(_) => 100,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            web_search,
            news_api_key,
            forum_search,
            openai_api_key,
            summary_model,
            max_citations_per_run,
            query_delay: Duration::from_millis(query_delay_ms),
        })
    }
}
