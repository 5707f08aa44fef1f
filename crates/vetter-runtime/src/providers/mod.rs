//! Provider abstractions for the semantic assessment leg.
//!
//! [`SemanticProvider`] is the only seam the engine depends on; the adapter
//! in [`crate::semantic`] validates whatever comes back. Concrete HTTP
//! providers are feature-gated.
//!
//! ## Security
//!
//! HTTP providers hold their credentials in [`secrets::ApiCredential`], which
//! redacts Debug output and zeroes the key on drop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use vetter_core::Subject;

pub mod secrets;

#[cfg(feature = "anthropic")]
mod anthropic;

pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "anthropic")]
pub use anthropic::{AnthropicConfig, AnthropicProvider};

/// Errors from providers. These never reach the engine: the adapters absorb
/// them into degraded partial results.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("payload parse error: {0}")]
    ParseError(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Raw semantic assessment payload, as loosely typed as the wire allows.
/// Field-level validation and coercion happen in the adapter, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticPayload {
    #[serde(default)]
    pub score: Option<f64>,

    #[serde(default)]
    pub confidence: Option<f64>,

    #[serde(default)]
    pub reasoning: Option<String>,

    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Normalized provider recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    Flag,
    Review,
}

impl Recommendation {
    /// Coerce a free-form recommendation string; anything unrecognized
    /// becomes the conservative default.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("approve") => Recommendation::Approve,
            Some("flag") => Recommendation::Flag,
            _ => Recommendation::Review,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Approve => "approve",
            Recommendation::Flag => "flag",
            Recommendation::Review => "review",
        }
    }
}

/// An externally supplied semantic scoring capability.
///
/// The engine depends only on this interface, never on a specific vendor.
#[async_trait]
pub trait SemanticProvider: Send + Sync {
    /// Assess a subject, optionally with a context line summarizing the
    /// rule engine's preliminary findings.
    async fn assess(
        &self,
        subject: &Subject,
        rule_context: Option<&str>,
    ) -> Result<SemanticPayload, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_coercion() {
        assert_eq!(Recommendation::coerce(Some("approve")), Recommendation::Approve);
        assert_eq!(Recommendation::coerce(Some(" FLAG ")), Recommendation::Flag);
        assert_eq!(Recommendation::coerce(Some("review")), Recommendation::Review);
        assert_eq!(Recommendation::coerce(Some("lgtm")), Recommendation::Review);
        assert_eq!(Recommendation::coerce(None), Recommendation::Review);
    }

    #[test]
    fn test_payload_tolerates_missing_fields() {
        let payload: SemanticPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.score.is_none());
        assert!(payload.confidence.is_none());

        let payload: SemanticPayload =
            serde_json::from_str(r#"{"score": 72.5, "recommendation": "approve"}"#).unwrap();
        assert_eq!(payload.score, Some(72.5));
        assert_eq!(payload.recommendation.as_deref(), Some("approve"));
    }
}
