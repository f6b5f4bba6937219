//! Check run pipeline
//!
//! ```text
//! Catalog ──▶ Rotation ──▶ ConcurrentScheduler ──▶ LedgerWriter
//!                           (QuorumEngine × Probe)
//! ```
//!
//! One run probes exactly one category. An empty catalog is a clean no-op;
//! only ledger failures make a run fail.

use std::sync::Arc;

use crate::checker::{ConcurrentScheduler, Probe, QuorumEngine};
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::models::{Catalog, RunStats, VerdictSet};
use crate::scheduler::RotationSelector;
use crate::storage::{LedgerReport, LedgerWriter};

/// Which category a run probes
#[derive(Debug, Clone)]
pub enum Selection {
    /// Day-of-year rotation
    Rotation(RotationSelector),
    /// Explicit category label
    Named(String),
}

/// Result of a check run
#[derive(Debug)]
pub enum CheckOutcome {
    /// Catalog has no categories; nothing was probed or written
    NoCategory,

    /// Requested category does not exist in the catalog
    UnknownCategory(String),

    /// Category probed and ledgers appended
    Checked {
        category: String,
        verdicts: VerdictSet,
        report: LedgerReport,
        stats: RunStats,
    },
}

/// Probes one category and records the verdicts
pub struct CheckPipeline {
    scheduler: ConcurrentScheduler,
    ledger: LedgerWriter,
    probe: Arc<dyn Probe>,
}

impl CheckPipeline {
    pub fn new(scheduler: ConcurrentScheduler, ledger: LedgerWriter, probe: Arc<dyn Probe>) -> Self {
        Self {
            scheduler,
            ledger,
            probe,
        }
    }

    /// Build the scheduler from the probing configuration
    pub fn from_config(config: &ProbeConfig, ledger: LedgerWriter, probe: Arc<dyn Probe>) -> Self {
        let scheduler = ConcurrentScheduler::new(config.worker_budget, QuorumEngine::from_config(config));
        Self::new(scheduler, ledger, probe)
    }

    /// Run one check.
    ///
    /// # Errors
    ///
    /// Returns an error only when a ledger cannot be appended.
    pub async fn run(&self, catalog: &Catalog, selection: &Selection) -> Result<CheckOutcome> {
        if catalog.is_empty() {
            tracing::info!("Catalog has no categories, nothing to check");
            return Ok(CheckOutcome::NoCategory);
        }

        let category = match selection {
            Selection::Rotation(selector) => {
                let Some(category) = selector.select(catalog) else {
                    return Ok(CheckOutcome::NoCategory);
                };
                tracing::info!(
                    category = %category.id,
                    day_of_year = selector.day_of_year(),
                    categories = catalog.len(),
                    "Selected category by rotation"
                );
                category
            }
            Selection::Named(name) => match catalog.get(name) {
                Some(category) => category,
                None => return Ok(CheckOutcome::UnknownCategory(name.clone())),
            },
        };

        let before = self.scheduler.stats();
        let verdicts = self.scheduler.run(category, Arc::clone(&self.probe)).await;
        let after = self.scheduler.stats();
        let stats = RunStats {
            total: after.total - before.total,
            alive: after.alive - before.alive,
            dead: after.dead - before.dead,
            failed: after.failed - before.failed,
        };

        let report = self.ledger.append(&category.id, &verdicts)?;

        tracing::info!(
            category = %category.id,
            total = stats.total,
            alive = stats.alive,
            dead = stats.dead,
            failed = stats.failed,
            alive_ratio = %format!("{:.1}%", stats.alive_ratio()),
            "Check complete"
        );

        Ok(CheckOutcome::Checked {
            category: category.id.clone(),
            verdicts,
            report,
            stats,
        })
    }
}
