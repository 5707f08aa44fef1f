//! Semantic assessor adapter.
//!
//! Wraps one [`SemanticProvider`] call per run and normalizes whatever comes
//! back: out-of-range or non-finite numbers become neutral defaults, the
//! rationale is length-bounded, the recommendation is coerced into a closed
//! enum. Any failure degrades to a neutral partial with the cause recorded —
//! this adapter never returns an error.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use moka::future::Cache;
use vetter_core::{PartialResult, SourceKind, Subject};

use crate::config::RuntimeConfig;
use crate::providers::{Recommendation, SemanticPayload, SemanticProvider};
use crate::resilience::guard;

/// Neutral score substituted for an absent or invalid semantic score.
const NEUTRAL_SCORE: f64 = 50.0;
/// Confidence reported when the semantic leg degrades.
const DEGRADED_CONFIDENCE: f64 = 0.0;
/// Upper bound, in chars, on the rationale carried into the record.
const MAX_REASONING_LEN: usize = 500;

/// Result of the semantic leg, with cache provenance for call accounting.
#[derive(Debug, Clone)]
pub struct SemanticAssessment {
    pub partial: PartialResult,

    /// True when served from the cache without a provider call.
    pub cache_hit: bool,
}

/// Adapter around the externally supplied semantic scoring capability.
pub struct SemanticAssessor {
    provider: Arc<dyn SemanticProvider>,
    cache: Cache<u64, PartialResult>,
    config: RuntimeConfig,
}

impl SemanticAssessor {
    pub fn new(provider: Arc<dyn SemanticProvider>, config: RuntimeConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.semantic_cache_entries)
            .time_to_live(config.semantic_cache_ttl)
            .build();

        Self {
            provider,
            cache,
            config,
        }
    }

    /// Assess a subject, passing the rule engine's preliminary findings as
    /// context. Always resolves to a partial; degradation is recorded, never
    /// raised.
    pub async fn assess(
        &self,
        subject: &Subject,
        rule_result: Option<&PartialResult>,
    ) -> SemanticAssessment {
        let key = fingerprint(subject, rule_result);
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(subject_id = %subject.id, "semantic assessment served from cache");
            return SemanticAssessment {
                partial: cached,
                cache_hit: true,
            };
        }

        let context = rule_result.map(|r| {
            format!(
                "preliminary score {:.0}, {} flags raised",
                r.score,
                r.flag_count()
            )
        });

        let guarded = guard(
            "semantic",
            self.config.semantic_timeout,
            self.provider.assess(subject, context.as_deref()),
            SemanticPayload::default,
        )
        .await;

        let mut partial = match guarded.degraded {
            None => normalize(guarded.value),
            Some(cause) => PartialResult::degraded(
                SourceKind::Semantic,
                NEUTRAL_SCORE,
                DEGRADED_CONFIDENCE,
                cause,
            ),
        };
        partial.latency_ms = guarded.latency_ms;

        // Only clean assessments are worth replaying.
        if partial.error.is_none() {
            self.cache.insert(key, partial.clone()).await;
        }

        SemanticAssessment {
            partial,
            cache_hit: false,
        }
    }
}

/// Validate and coerce a raw payload into a partial result.
fn normalize(payload: SemanticPayload) -> PartialResult {
    let mut partial = PartialResult::new(SourceKind::Semantic, NEUTRAL_SCORE);

    match payload.score.filter(|s| s.is_finite() && (0.0..=100.0).contains(s)) {
        Some(score) => partial.score = score,
        None => partial
            .details
            .push("score missing or out of range; substituted neutral".to_string()),
    }

    match payload
        .confidence
        .filter(|c| c.is_finite() && (0.0..=100.0).contains(c))
    {
        Some(confidence) => partial.confidence = Some(confidence),
        None => {
            partial.confidence = Some(DEGRADED_CONFIDENCE);
            partial
                .details
                .push("confidence missing or out of range; substituted zero".to_string());
        }
    }

    if let Some(reasoning) = payload.reasoning {
        let mut reasoning = reasoning;
        // Truncate by chars, not bytes: a byte index can split a multi-byte
        // character and panic.
        if let Some((boundary, _)) = reasoning.char_indices().nth(MAX_REASONING_LEN) {
            reasoning.truncate(boundary);
            reasoning.push('…');
        }
        partial.details.push(reasoning);
    }

    let recommendation = Recommendation::coerce(payload.recommendation.as_deref());
    partial
        .details
        .push(format!("recommendation: {}", recommendation.as_str()));

    partial
}

/// Cache key over the subject attributes and the rule context that shaped
/// the prompt.
fn fingerprint(subject: &Subject, rule_result: Option<&PartialResult>) -> u64 {
    let mut hasher = DefaultHasher::new();
    subject.id.hash(&mut hasher);
    subject.full_name.hash(&mut hasher);
    subject.company_name.hash(&mut hasher);
    subject.contact.email.hash(&mut hasher);
    subject.contact.phone.hash(&mut hasher);
    subject.role.hash(&mut hasher);
    subject.industry.hash(&mut hasher);
    subject.website.hash(&mut hasher);
    if let Some(rule) = rule_result {
        rule.score.to_bits().hash(&mut hasher);
        rule.flag_count().hash(&mut hasher);
    }
    hasher.finish()
}
