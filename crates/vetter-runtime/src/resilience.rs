//! Degradation guard and usage accounting.
//!
//! Every provider-backed sub-call in this crate goes through [`guard`]: a
//! timeout wrapper that converts failure or elapse into a caller-supplied
//! fallback value. The cause is captured so the caller can record it; nothing
//! here ever panics or propagates a provider error. This keeps the decision
//! engine itself free of defensive error handling.

use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;

/// Outcome of a guarded sub-call: the resolved value (live or fallback),
/// the degradation cause if any, and the observed latency.
#[derive(Debug, Clone)]
pub struct GuardedOutcome<T> {
    pub value: T,
    pub degraded: Option<String>,
    pub latency_ms: u64,
}

impl<T> GuardedOutcome<T> {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Run a provider future under a timeout, degrading to `fallback` on error
/// or elapse. A timeout affects only this call; concurrent siblings are
/// untouched.
pub async fn guard<T, Fut>(
    source: &str,
    timeout: Duration,
    fut: Fut,
    fallback: impl FnOnce() -> T,
) -> GuardedOutcome<T>
where
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let started = Instant::now();

    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => GuardedOutcome {
            value,
            degraded: None,
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Ok(Err(e)) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            tracing::warn!(source, error = %e, latency_ms, "sub-call failed, degrading");
            GuardedOutcome {
                value: fallback(),
                degraded: Some(e.to_string()),
                latency_ms,
            }
        }
        Err(_) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            tracing::warn!(source, timeout = ?timeout, "sub-call timed out, degrading");
            GuardedOutcome {
                value: fallback(),
                degraded: Some(format!("timed out after {:?}", timeout)),
                latency_ms,
            }
        }
    }
}

/// Cumulative provider-call accounting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Calls issued, including ones that later degraded.
    pub total_calls: u32,

    /// Calls that degraded to a fallback.
    pub degraded_calls: u32,
}

/// Process-wide usage tracker, shared across invocations.
#[derive(Default)]
pub struct UsageTracker {
    usage: RwLock<Usage>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, degraded: bool) {
        let mut usage = self.usage.write();
        usage.total_calls += 1;
        if degraded {
            usage.degraded_calls += 1;
        }
    }

    pub fn snapshot(&self) -> Usage {
        *self.usage.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guard_passes_through_success() {
        let outcome = guard(
            "test",
            Duration::from_secs(1),
            async { Ok::<_, ProviderError>(42) },
            || 0,
        )
        .await;

        assert_eq!(outcome.value, 42);
        assert!(!outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_guard_degrades_on_error() {
        let outcome = guard(
            "test",
            Duration::from_secs(1),
            async { Err::<i32, _>(ProviderError::HttpError("boom".to_string())) },
            || 7,
        )
        .await;

        assert_eq!(outcome.value, 7);
        assert!(outcome.degraded.as_deref().unwrap().contains("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_degrades_on_timeout() {
        let outcome = guard(
            "test",
            Duration::from_millis(50),
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, ProviderError>(1)
            },
            || -1,
        )
        .await;

        assert_eq!(outcome.value, -1);
        assert!(outcome.degraded.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn test_usage_tracker() {
        let tracker = UsageTracker::new();
        tracker.record(false);
        tracker.record(true);
        tracker.record(false);

        let usage = tracker.snapshot();
        assert_eq!(usage.total_calls, 3);
        assert_eq!(usage.degraded_calls, 1);
    }
}
