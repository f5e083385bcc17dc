//! Engine configuration types for Registrar.
//!
//! `EngineConfig` represents the top-level `config.toml` that tunes the
//! query cache, the intent resolver and session history bounds.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Registrar engine.
///
/// Loaded from `~/.registrar/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds a cached result may be served.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Entry count above which the oldest fifth of the cache is evicted.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Minimum score an intent must exceed to beat the fallback.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,

    /// Messages kept per session.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Sentiment samples kept per session.
    #[serde(default = "default_sentiment_limit")]
    pub sentiment_limit: usize,

    /// Records database. Defaults to `{data_dir}/registrar.db`.
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    100
}

fn default_confidence_floor() -> f64 {
    0.1
}

fn default_history_limit() -> usize {
    20
}

fn default_sentiment_limit() -> usize {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            confidence_floor: default_confidence_floor(),
            history_limit: default_history_limit(),
            sentiment_limit: default_sentiment_limit(),
            database_url: None,
        }
    }
}
