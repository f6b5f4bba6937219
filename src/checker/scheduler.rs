//! Bounded-concurrency evaluation of a category
//!
//! Every source of a category is evaluated by the [`QuorumEngine`], with at
//! most `worker_budget` evaluations in flight. Verdicts are collected as they
//! complete, in any order; the run returns once every source has one.
//!
//! Sources sharing a name are all evaluated, and whichever completes last
//! owns the entry for that name. Which duplicate wins is not deterministic
//! under concurrency; this is accepted behavior.

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{Probe, QuorumEngine};
use crate::models::{Category, RunStats, Verdict, VerdictSet};
use crate::utils::error::ProbeError;

/// Run counters (thread-safe)
#[derive(Debug, Default)]
pub struct ProbeStats {
    pub total: AtomicU64,
    pub alive: AtomicU64,
    pub dead: AtomicU64,
    pub failed: AtomicU64,
}

impl ProbeStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record(&self, verdict: &Verdict, evaluation_failed: bool) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if verdict.alive {
            self.alive.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dead.fetch_add(1, Ordering::Relaxed);
        }
        if evaluation_failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of current stats
    pub fn snapshot(&self) -> RunStats {
        RunStats {
            total: self.total.load(Ordering::Relaxed),
            alive: self.alive.load(Ordering::Relaxed),
            dead: self.dead.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Evaluates all sources of a category under a worker budget
#[derive(Debug, Clone)]
pub struct ConcurrentScheduler {
    worker_budget: usize,
    engine: Arc<QuorumEngine>,
    stats: Arc<ProbeStats>,
}

impl ConcurrentScheduler {
    /// Create a scheduler; a zero budget is raised to one worker
    pub fn new(worker_budget: usize, engine: QuorumEngine) -> Self {
        Self {
            worker_budget: worker_budget.max(1),
            engine: Arc::new(engine),
            stats: ProbeStats::new(),
        }
    }

    pub fn worker_budget(&self) -> usize {
        self.worker_budget
    }

    /// Counters accumulated over all runs of this scheduler
    pub fn stats(&self) -> RunStats {
        self.stats.snapshot()
    }

    /// Evaluate every source of `category`.
    ///
    /// Never fails: a source whose evaluation dies is recorded as not alive.
    pub async fn run(&self, category: &Category, probe: Arc<dyn Probe>) -> VerdictSet {
        let mut verdicts = VerdictSet::for_sources(&category.sources);

        info!(
            category = %category.id,
            sources = category.sources.len(),
            worker_budget = self.worker_budget,
            rounds = self.engine.rounds(),
            probe = probe.name(),
            "Checking category"
        );

        let mut completions = stream::iter(category.sources.iter().cloned())
            .map(|source| {
                let engine = Arc::clone(&self.engine);
                let probe = Arc::clone(&probe);
                async move {
                    let address = source.address.clone();
                    // Spawned so that a panicking probe only takes down its own source
                    let handle =
                        tokio::spawn(async move { engine.evaluate(probe.as_ref(), &address).await });
                    (source, handle.await)
                }
            })
            .buffer_unordered(self.worker_budget);

        while let Some((source, joined)) = completions.next().await {
            let (verdict, evaluation_failed) = match joined {
                Ok(outcome) => (outcome.into_verdict(source), false),
                Err(e) => {
                    let error = ProbeError::TaskFailed(e.to_string());
                    warn!(source = %source.name, address = %source.address, error = %error, "Source evaluation failed");
                    (Verdict::failed(source, error.to_string()), true)
                }
            };

            debug!(
                source = %verdict.source.name,
                alive = verdict.alive,
                successes = verdict.successes,
                attempts = verdict.attempts,
                last_error = ?verdict.last_error,
                "Source evaluated"
            );

            self.stats.record(&verdict, evaluation_failed);
            if let Some(previous) = verdicts.insert(verdict) {
                debug!(source = %previous.source.name, address = %previous.source.address, "Duplicate source name, keeping later verdict");
            }
        }

        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::ProbeOutcome;
    use crate::models::Source;
    use crate::utils::retry::BackoffPolicy;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Alive when the address contains "up"; panics on "boom"
    struct AddressProbe;

    #[async_trait]
    impl Probe for AddressProbe {
        fn name(&self) -> &str {
            "address"
        }

        async fn attempt(&self, address: &str, _timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
            if address.contains("boom") {
                panic!("probe exploded");
            }
            if address.contains("up") {
                Ok(ProbeOutcome {
                    latency: Duration::from_millis(1),
                })
            } else {
                Err(ProbeError::Timeout)
            }
        }
    }

    fn scheduler(budget: usize) -> ConcurrentScheduler {
        ConcurrentScheduler::new(
            budget,
            QuorumEngine::new(1, Duration::from_secs(1), BackoffPolicy::none()),
        )
    }

    fn category(sources: &[(&str, &str)]) -> Category {
        let mut category = Category::new("News", "News,#genre#");
        category.sources = sources
            .iter()
            .map(|(name, address)| Source::new(*name, *address))
            .collect();
        category
    }

    #[tokio::test]
    async fn test_routes_alive_and_dead() {
        let category = category(&[("A", "http://up/a"), ("B", "http://down/b")]);
        let verdicts = scheduler(4).run(&category, Arc::new(AddressProbe)).await;

        assert_eq!(verdicts.len(), 2);
        assert!(verdicts.get("A").unwrap().alive);
        assert!(!verdicts.get("B").unwrap().alive);
    }

    #[tokio::test]
    async fn test_panicking_source_does_not_abort_batch() {
        let category = category(&[
            ("A", "http://up/a"),
            ("B", "http://boom/b"),
            ("C", "http://up/c"),
        ]);
        let scheduler = scheduler(2);
        let verdicts = scheduler.run(&category, Arc::new(AddressProbe)).await;

        assert_eq!(verdicts.len(), 3);
        let failed = verdicts.get("B").unwrap();
        assert!(!failed.alive);
        assert!(failed.last_error.is_some());

        let stats = scheduler.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.alive, 2);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn test_empty_category() {
        let verdicts = scheduler(4).run(&category(&[]), Arc::new(AddressProbe)).await;
        assert!(verdicts.is_empty());
    }

    #[test]
    fn test_zero_budget_raised() {
        assert_eq!(scheduler(0).worker_budget(), 1);
    }
}
