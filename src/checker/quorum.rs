//! Retry/quorum evaluation of a single source
//!
//! Every source gets `rounds` sequential attempts. The source is alive when
//! strictly more than `rounds / 2` attempts succeed (threshold
//! `rounds / 2 + 1`). A single attempt never raises: timeouts, connection
//! errors and bad status codes all count as a failed attempt.

use std::time::Duration;
use tracing::{debug, trace};

use super::Probe;
use crate::config::ProbeConfig;
use crate::models::{Source, Verdict};
use crate::utils::error::ProbeError;
use crate::utils::retry::BackoffPolicy;

/// Number of successes needed for an alive verdict
pub fn majority_threshold(rounds: u32) -> u32 {
    rounds / 2 + 1
}

/// Majority rule: `successes > rounds / 2`
pub fn is_majority(successes: u32, rounds: u32) -> bool {
    successes >= majority_threshold(rounds)
}

/// Aggregated attempts for one address
#[derive(Debug, Clone, PartialEq)]
pub struct QuorumOutcome {
    pub alive: bool,
    pub successes: u32,
    pub attempts: u32,

    /// Latency of the last successful attempt
    pub latency: Option<Duration>,

    /// Error of the last failed attempt
    pub last_error: Option<String>,
}

impl QuorumOutcome {
    /// Attach the outcome to its source
    pub fn into_verdict(self, source: Source) -> Verdict {
        Verdict {
            source,
            alive: self.alive,
            latency: self.latency,
            successes: self.successes,
            attempts: self.attempts,
            last_error: self.last_error,
        }
    }
}

/// Runs the attempts of one source and applies the majority rule
#[derive(Debug, Clone)]
pub struct QuorumEngine {
    rounds: u32,
    timeout: Duration,
    backoff: BackoffPolicy,
}

impl QuorumEngine {
    /// Create an engine; `rounds` is clamped to at least one attempt
    pub fn new(rounds: u32, timeout: Duration, backoff: BackoffPolicy) -> Self {
        Self {
            rounds: rounds.max(1),
            timeout,
            backoff,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(
            config.attempts_per_source,
            config.per_attempt_timeout(),
            config.backoff(),
        )
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Evaluate one address.
    ///
    /// Attempts are strictly sequential: attempt `k + 1` starts only after
    /// attempt `k` completed or timed out.
    pub async fn evaluate(&self, probe: &dyn Probe, address: &str) -> QuorumOutcome {
        let mut successes = 0;
        let mut latency = None;
        let mut last_error = None;

        for attempt in 0..self.rounds {
            let delay = self.backoff.delay_before(attempt);
            if !delay.is_zero() {
                trace!(address = %address, attempt, delay_ms = delay.as_millis(), "Waiting before next attempt");
                tokio::time::sleep(delay).await;
            }

            // The outer timeout bounds probes that ignore their own deadline
            let result = match tokio::time::timeout(self.timeout, probe.attempt(address, self.timeout)).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout),
            };

            match result {
                Ok(outcome) => {
                    successes += 1;
                    latency = Some(outcome.latency);
                    debug!(
                        address = %address,
                        attempt,
                        latency_ms = outcome.latency.as_millis(),
                        "Probe attempt succeeded"
                    );
                }
                Err(e) => {
                    debug!(address = %address, attempt, error = %e, "Probe attempt failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        QuorumOutcome {
            alive: is_majority(successes, self.rounds),
            successes,
            attempts: self.rounds,
            latency,
            last_error,
        }
    }
}
