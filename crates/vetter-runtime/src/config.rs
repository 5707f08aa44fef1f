//! Runtime configuration: sub-call timeouts, cache sizing, batch defaults.
//!
//! Loaded once and passed into the engine at construction; never mutated at
//! runtime. Durations are serialized as integer seconds.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vetter_core::ScoringConfig;

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

/// Configuration for the async runtime layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Timeout for each verification channel call.
    #[serde(with = "duration_secs")]
    pub channel_timeout: Duration,

    /// Timeout for the semantic assessment call.
    #[serde(with = "duration_secs")]
    pub semantic_timeout: Duration,

    /// Semantic assessment cache capacity (entries).
    pub semantic_cache_entries: u64,

    /// Semantic assessment cache TTL.
    #[serde(with = "duration_secs")]
    pub semantic_cache_ttl: Duration,

    /// Default batch concurrency when the caller does not specify one.
    pub default_concurrency: usize,

    /// Scoring weights, thresholds, and tuning.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel_timeout: Duration::from_secs(5),
            semantic_timeout: Duration::from_secs(15),
            semantic_cache_entries: 10_000,
            semantic_cache_ttl: Duration::from_secs(3600),
            default_concurrency: 5,
            scoring: ScoringConfig::default(),
        }
    }
}
