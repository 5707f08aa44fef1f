//! Verification channels and their degradation fallbacks.
//!
//! One [`VerificationProvider`] per channel. When a provider call fails or
//! times out, the aggregator degrades that channel to [`heuristic_outcome`]:
//! a deterministic, attribute-only estimate that stands in at reduced
//! confidence. A channel with no attribute to fall back on resolves to
//! nothing, which is how "every channel failed" becomes observable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vetter_core::Subject;

use crate::providers::ProviderError;

/// Verification channels fanned out by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Phone,
    Company,
    Domain,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phone",
            Channel::Company => "company",
            Channel::Domain => "domain",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one channel verification call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Channel score in [0, 100].
    pub score: f64,

    /// Whether the channel considers the attribute valid.
    pub valid: bool,

    /// Human-readable detail for the audit trail.
    pub detail: String,
}

/// One verification channel backed by an external service.
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    fn channel(&self) -> Channel;

    async fn verify(&self, subject: &Subject) -> Result<VerificationOutcome, ProviderError>;
}

/// Deterministic attribute-only estimate used when a channel degrades.
///
/// Returns `None` when the subject carries nothing this channel could judge —
/// that channel then counts as unresolved rather than contributing a made-up
/// score.
pub fn heuristic_outcome(channel: Channel, subject: &Subject) -> Option<VerificationOutcome> {
    match channel {
        Channel::Email => {
            let email = subject.contact.email.as_deref()?.trim();
            if email.is_empty() {
                return None;
            }
            let plausible = email.contains('@') && email.rsplit('@').next().is_some_and(|d| d.contains('.'));
            Some(shape_outcome(plausible, "email shape"))
        }
        Channel::Phone => {
            let phone = subject.contact.phone.as_deref()?.trim();
            if phone.is_empty() {
                return None;
            }
            let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
            Some(shape_outcome((7..=15).contains(&digits), "phone shape"))
        }
        Channel::Company => {
            let company = subject.company_name.trim();
            if company.is_empty() {
                return None;
            }
            Some(shape_outcome(company.len() >= 3, "company name shape"))
        }
        Channel::Domain => {
            let website = subject.website.as_deref()?.trim();
            if website.is_empty() {
                return None;
            }
            Some(shape_outcome(website.contains('.'), "website shape"))
        }
    }
}

fn shape_outcome(plausible: bool, what: &str) -> VerificationOutcome {
    if plausible {
        VerificationOutcome {
            score: 65.0,
            valid: true,
            detail: format!("fallback heuristic: {} plausible", what),
        }
    } else {
        VerificationOutcome {
            score: 35.0,
            valid: false,
            detail: format!("fallback heuristic: {} implausible", what),
        }
    }
}

/// Provider that answers from the fallback heuristics directly. Used when no
/// external verification service is wired up (offline/CLI runs) and as a
/// test double.
pub struct HeuristicProvider {
    channel: Channel,
}

impl HeuristicProvider {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    /// One heuristic provider per channel.
    pub fn full_set() -> Vec<std::sync::Arc<dyn VerificationProvider>> {
        [Channel::Email, Channel::Phone, Channel::Company, Channel::Domain]
            .into_iter()
            .map(|c| std::sync::Arc::new(HeuristicProvider::new(c)) as _)
            .collect()
    }
}

#[async_trait]
impl VerificationProvider for HeuristicProvider {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn verify(&self, subject: &Subject) -> Result<VerificationOutcome, ProviderError> {
        heuristic_outcome(self.channel, subject).ok_or_else(|| {
            ProviderError::NotConfigured(format!("no {} attribute to verify", self.channel))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_heuristics_score_plausible_attributes() {
        let s = subject();
        for channel in [Channel::Email, Channel::Phone, Channel::Company, Channel::Domain] {
            let outcome = heuristic_outcome(channel, &s).unwrap();
            assert_eq!(outcome.score, 65.0);
            assert!(outcome.valid);
        }
    }

    #[test]
    fn test_heuristic_none_when_attribute_missing() {
        let mut s = subject();
        s.contact.email = None;
        s.website = Some("   ".to_string());

        assert!(heuristic_outcome(Channel::Email, &s).is_none());
        assert!(heuristic_outcome(Channel::Domain, &s).is_none());
        assert!(heuristic_outcome(Channel::Phone, &s).is_some());
    }

    #[test]
    fn test_heuristic_implausible_shape() {
        let mut s = subject();
        s.contact.phone = Some("123".to_string());
        let outcome = heuristic_outcome(Channel::Phone, &s).unwrap();
        assert_eq!(outcome.score, 35.0);
        assert!(!outcome.valid);
    }

    #[tokio::test]
    async fn test_heuristic_provider_errors_without_attribute() {
        let mut s = subject();
        s.contact.email = None;
        let provider = HeuristicProvider::new(Channel::Email);
        assert!(provider.verify(&s).await.is_err());
    }
}
