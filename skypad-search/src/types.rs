//! Shared configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::embedder::openai::DEFAULT_MODEL;
use crate::errors::{Result, SearchError};

fn validate_timeout(timeout: &Duration) -> std::result::Result<(), validator::ValidationError> {
    if timeout.is_zero() {
        return Err(validator::ValidationError::new("request_timeout must be > 0"));
    }
    Ok(())
}

/// Connection and provider settings, loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SkypadConfig {
    /// Neo4j connection URI (e.g. `bolt://localhost:7687`).
    #[validate(length(min = 1))]
    pub neo4j_uri: String,

    /// Neo4j username.
    #[validate(length(min = 1))]
    pub neo4j_user: String,

    /// Neo4j password.
    #[validate(length(min = 1))]
    pub neo4j_password: String,

    /// Database name; the server default when unset.
    pub neo4j_database: Option<String>,

    /// OpenAI API key. Without it searches fall back to plain text matching.
    pub openai_api_key: Option<String>,

    /// Embedding model name.
    #[validate(length(min = 1))]
    pub embedding_model: String,

    /// Maximum number of cached query embeddings.
    pub embedding_cache_capacity: u64,

    /// Upper bound for each embedding call and store query, in seconds.
    #[validate(range(min = 1))]
    pub search_timeout_secs: u64,
}

impl Default for SkypadConfig {
    fn default() -> Self {
        Self {
            neo4j_uri: "bolt://localhost:7687".to_string(),
            neo4j_user: "neo4j".to_string(),
            neo4j_password: String::new(),
            neo4j_database: None,
            openai_api_key: None,
            embedding_model: DEFAULT_MODEL.to_string(),
            embedding_cache_capacity: 1_000,
            search_timeout_secs: 30,
        }
    }
}

impl SkypadConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` first (non-fatal if `.env` is absent).
    /// `NEO4J_PASSWORD` is required since there is no fallback store; a missing
    /// or blank `OPENAI_API_KEY` only disables semantic scoring.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let neo4j_password = std::env::var("NEO4J_PASSWORD")
            .map_err(|_| SearchError::Validation("NEO4J_PASSWORD is required".to_string()))?;

        let config = Self {
            neo4j_uri: std::env::var("NEO4J_URI").unwrap_or(defaults.neo4j_uri),
            neo4j_user: std::env::var("NEO4J_USERNAME").unwrap_or(defaults.neo4j_user),
            neo4j_password,
            neo4j_database: non_blank_var("NEO4J_DATABASE"),
            openai_api_key: non_blank_var("OPENAI_API_KEY"),
            embedding_model: std::env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_cache_capacity: parse_var(
                "EMBEDDING_CACHE_CAPACITY",
                defaults.embedding_cache_capacity,
            )?,
            search_timeout_secs: parse_var("SEARCH_TIMEOUT_SECS", defaults.search_timeout_secs)?,
        };

        config
            .validate()
            .map_err(|e| SearchError::Validation(e.to_string()))?;

        Ok(config)
    }

    /// Search tuning derived from this configuration.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            request_timeout: Duration::from_secs(self.search_timeout_secs),
            ..SearchConfig::default()
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(val) => val.parse::<u64>().map_err(|_| {
            SearchError::Validation(format!("{name} must be a non-negative integer"))
        }),
        Err(_) => Ok(default),
    }
}

/// Thresholds and limits used by [`crate::search::SearchEngine`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchConfig {
    /// Free-text search keeps candidates scoring strictly above this.
    #[validate(range(min = 0.0, max = 1.0))]
    pub domain_threshold: f32,

    /// Image-only search keeps candidates scoring at or above this.
    #[validate(range(min = 0.0, max = 1.0))]
    pub image_threshold: f32,

    /// Reference ("more like this") search keeps candidates at or above this.
    #[validate(range(min = 0.0, max = 1.0))]
    pub reference_threshold: f32,

    /// A domain-scoped top hit above this skips the global pass.
    #[validate(range(min = 0.0, max = 1.0))]
    pub early_exit_score: f32,

    /// Score assigned to every plain-text fallback hit.
    #[validate(range(min = 0.0, max = 1.0))]
    pub fallback_score: f32,

    /// Bound on each embedding call and store query.
    #[validate(custom(function = "validate_timeout"))]
    pub request_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            domain_threshold: 0.1,
            image_threshold: 0.15,
            reference_threshold: 0.3,
            early_exit_score: 0.3,
            fallback_score: 0.5,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SearchConfig {
    /// Validate, returning the config on success.
    pub fn validated(self) -> Result<Self> {
        self.validate()
            .map_err(|e| SearchError::Validation(e.to_string()))?;
        Ok(self)
    }
}
