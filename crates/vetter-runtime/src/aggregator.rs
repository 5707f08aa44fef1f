//! External verification aggregator: concurrent fan-out over the
//! verification channels, fan-in by arithmetic mean.
//!
//! Failure isolation is per channel: a timeout or provider error degrades
//! only that channel to its fallback heuristic; siblings continue. Only when
//! no channel resolves at all does the whole leg collapse to a fixed
//! low-neutral result.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use vetter_core::{PartialResult, SourceKind, Subject};

use crate::config::RuntimeConfig;
use crate::resilience::{guard, UsageTracker};
use crate::verification::{heuristic_outcome, Channel, VerificationOutcome, VerificationProvider};

/// Confidence attributed to a live provider answer.
const LIVE_CONFIDENCE: f64 = 85.0;
/// Confidence attributed to a fallback heuristic answer.
const FALLBACK_CONFIDENCE: f64 = 30.0;
/// Score when no channel resolves at all.
const ALL_FAILED_SCORE: f64 = 40.0;
/// Confidence when no channel resolves at all.
const ALL_FAILED_CONFIDENCE: f64 = 20.0;

/// Result of the external leg: the partial plus per-run call accounting.
#[derive(Debug, Clone)]
pub struct ExternalVerification {
    pub partial: PartialResult,

    /// Verification calls issued for this run.
    pub api_calls: u32,
}

/// Fan-out/fan-in over the configured verification channels.
pub struct ExternalAggregator {
    providers: Vec<Arc<dyn VerificationProvider>>,
    config: RuntimeConfig,
    usage: UsageTracker,
}

struct ChannelReport {
    channel: Channel,
    outcome: Option<VerificationOutcome>,
    confidence: f64,
    error: Option<String>,
    latency_ms: u64,
}

impl ExternalAggregator {
    pub fn new(providers: Vec<Arc<dyn VerificationProvider>>, config: RuntimeConfig) -> Self {
        Self {
            providers,
            config,
            usage: UsageTracker::new(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.providers.len()
    }

    /// Cumulative call accounting across invocations.
    pub fn usage(&self) -> crate::resilience::Usage {
        self.usage.snapshot()
    }

    /// Verify a subject across all channels concurrently.
    pub async fn verify(&self, subject: &Subject) -> ExternalVerification {
        let started = Instant::now();

        let calls = self
            .providers
            .iter()
            .map(|provider| self.verify_channel(provider.as_ref(), subject));
        let reports = join_all(calls).await;

        let api_calls = reports.len() as u32;
        for report in &reports {
            self.usage.record(report.error.is_some());
        }

        let partial = self.fan_in(reports);
        let partial = partial.with_latency(started.elapsed().as_millis() as u64);

        tracing::debug!(
            subject_id = %subject.id,
            score = partial.score,
            degraded = partial.error.is_some(),
            "external verification complete"
        );

        ExternalVerification { partial, api_calls }
    }

    /// One channel under its own timeout. Degrades to the fallback heuristic;
    /// resolves to nothing if even the fallback has no attribute to judge.
    async fn verify_channel(
        &self,
        provider: &dyn VerificationProvider,
        subject: &Subject,
    ) -> ChannelReport {
        let channel = provider.channel();

        let guarded = guard(
            channel.as_str(),
            self.config.channel_timeout,
            async { provider.verify(subject).await.map(Some) },
            || heuristic_outcome(channel, subject),
        )
        .await;

        let confidence = if guarded.is_degraded() {
            FALLBACK_CONFIDENCE
        } else {
            LIVE_CONFIDENCE
        };

        ChannelReport {
            channel,
            outcome: guarded.value,
            confidence,
            error: guarded.degraded,
            latency_ms: guarded.latency_ms,
        }
    }

    /// Mean over all resolved channels; fixed low-neutral if none resolved.
    fn fan_in(&self, reports: Vec<ChannelReport>) -> PartialResult {
        let mut result = PartialResult::new(SourceKind::External, 0.0);
        let mut resolved_scores = Vec::new();
        let mut resolved_confidences = Vec::new();
        let mut errors = Vec::new();

        for report in reports {
            match report.outcome {
                Some(outcome) => {
                    result.details.push(format!(
                        "{}: {:.0} ({}) [{}ms]",
                        report.channel, outcome.score, outcome.detail, report.latency_ms
                    ));
                    resolved_scores.push(outcome.score);
                    resolved_confidences.push(report.confidence);
                }
                None => {
                    result
                        .details
                        .push(format!("{}: unresolved [{}ms]", report.channel, report.latency_ms));
                }
            }
            if let Some(error) = report.error {
                errors.push(format!("{}: {}", report.channel, error));
            }
        }

        if resolved_scores.is_empty() {
            result.score = ALL_FAILED_SCORE;
            result.confidence = Some(ALL_FAILED_CONFIDENCE);
            result.details.push("no verification channel resolved".to_string());
        } else {
            result.score = mean(&resolved_scores);
            result.confidence = Some(mean(&resolved_confidences));
        }

        if !errors.is_empty() {
            result.error = Some(errors.join("; "));
        }

        result
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use std::time::Duration;
    use vetter_core::ContactChannels;

    fn subject() -> Subject {
        Subject {
            id: "s-1".to_string(),
            full_name: "Jane Doe".to_string(),
            company_name: "Acme".to_string(),
            contact: ContactChannels {
                email: Some("jane@acme.com".to_string()),
                phone: Some("+1 415 555 0132".to_string()),
            },
            role: None,
            industry: None,
            website: Some("https://acme.com".to_string()),
        }
    }

    /// Provider with a scripted behavior per channel.
    struct ScriptedProvider {
        channel: Channel,
        behavior: Behavior,
    }

    enum Behavior {
        Score(f64),
        Error,
        Hang,
    }

    #[async_trait]
    impl VerificationProvider for ScriptedProvider {
        fn channel(&self) -> Channel {
            self.channel
        }

        async fn verify(&self, _subject: &Subject) -> Result<VerificationOutcome, ProviderError> {
            match self.behavior {
                Behavior::Score(score) => Ok(VerificationOutcome {
                    score,
                    valid: true,
                    detail: "scripted".to_string(),
                }),
                Behavior::Error => Err(ProviderError::HttpError("unreachable".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(600)).await;
                    unreachable!("guard should have timed out")
                }
            }
        }
    }

    fn aggregator(providers: Vec<Arc<dyn VerificationProvider>>) -> ExternalAggregator {
        let config = RuntimeConfig {
            channel_timeout: Duration::from_millis(100),
            ..RuntimeConfig::default()
        };
        ExternalAggregator::new(providers, config)
    }

    fn scripted(channel: Channel, behavior: Behavior) -> Arc<dyn VerificationProvider> {
        Arc::new(ScriptedProvider { channel, behavior })
    }

    #[tokio::test]
    async fn test_all_channels_resolve() {
        let agg = aggregator(vec![
            scripted(Channel::Email, Behavior::Score(80.0)),
            scripted(Channel::Phone, Behavior::Score(60.0)),
            scripted(Channel::Company, Behavior::Score(70.0)),
            scripted(Channel::Domain, Behavior::Score(90.0)),
        ]);

        let verification = agg.verify(&subject()).await;
        assert_eq!(verification.partial.score, 75.0);
        assert_eq!(verification.partial.confidence, Some(LIVE_CONFIDENCE));
        assert!(verification.partial.error.is_none());
        assert_eq!(verification.api_calls, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_timeout_degrades_to_fallback_mean() {
        // Email hangs; the other three resolve live. The email channel falls
        // back to the heuristic (65 for a plausible address), so the mean is
        // over all four resolved scores.
        let agg = aggregator(vec![
            scripted(Channel::Email, Behavior::Hang),
            scripted(Channel::Phone, Behavior::Score(60.0)),
            scripted(Channel::Company, Behavior::Score(70.0)),
            scripted(Channel::Domain, Behavior::Score(80.0)),
        ]);

        let verification = agg.verify(&subject()).await;
        let partial = &verification.partial;

        assert_eq!(partial.score, (65.0 + 60.0 + 70.0 + 80.0) / 4.0);
        assert!(partial.error.as_deref().unwrap().contains("email"));
        // Confidence blends three live channels and one fallback.
        let expected = (FALLBACK_CONFIDENCE + 3.0 * LIVE_CONFIDENCE) / 4.0;
        assert_eq!(partial.confidence, Some(expected));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_channel_without_attribute_is_unresolved() {
        // Domain times out and the subject has no website to fall back on,
        // so the channel resolves to nothing; the mean covers the other three.
        let mut s = subject();
        s.website = None;

        let agg = aggregator(vec![
            scripted(Channel::Email, Behavior::Score(60.0)),
            scripted(Channel::Phone, Behavior::Score(60.0)),
            scripted(Channel::Company, Behavior::Score(90.0)),
            scripted(Channel::Domain, Behavior::Hang),
        ]);

        let verification = agg.verify(&s).await;
        assert_eq!(verification.partial.score, 70.0);
        assert!(verification.partial.error.is_some());
    }

    #[tokio::test]
    async fn test_every_channel_failing_yields_low_neutral() {
        let mut s = subject();
        s.contact = ContactChannels::default();
        s.company_name = String::new();
        s.website = None;

        let agg = aggregator(vec![
            scripted(Channel::Email, Behavior::Error),
            scripted(Channel::Phone, Behavior::Error),
            scripted(Channel::Company, Behavior::Error),
            scripted(Channel::Domain, Behavior::Error),
        ]);

        let verification = agg.verify(&s).await;
        let partial = &verification.partial;

        assert_eq!(partial.score, ALL_FAILED_SCORE);
        assert_eq!(partial.confidence, Some(ALL_FAILED_CONFIDENCE));
        let error = partial.error.as_deref().unwrap();
        for channel in ["email", "phone", "company", "domain"] {
            assert!(error.contains(channel), "missing {} in {}", channel, error);
        }
    }

    #[tokio::test]
    async fn test_usage_accumulates_across_runs() {
        let agg = aggregator(vec![
            scripted(Channel::Email, Behavior::Score(70.0)),
            scripted(Channel::Phone, Behavior::Error),
        ]);

        agg.verify(&subject()).await;
        agg.verify(&subject()).await;

        let usage = agg.usage();
        assert_eq!(usage.total_calls, 4);
        assert_eq!(usage.degraded_calls, 2);
    }
}
