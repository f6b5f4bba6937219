//! livecheck - liveness classification for categorized live source catalogs
//!
//! Probes one catalog category per run, classifies every source as reachable
//! or not by majority vote over repeated attempts, and appends the result to
//! whitelist/blacklist ledgers. A second pipeline enriches catalog lines with
//! stream dimensions in resumable batches.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`catalog`] - Catalog text parsing
//! - [`models`] - Core data structures and types
//! - [`scheduler`] - Daily category rotation
//! - [`checker`] - Probe primitive, quorum engine and concurrent scheduler
//! - [`storage`] - Ledger writer and batch cursor
//! - [`enrich`] - Resumable metadata enrichment
//! - [`pipeline`] - End-to-end check run
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use livecheck::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let catalog = livecheck::catalog::load_catalog(&config.paths.catalog)?;
//!     let ledger = LedgerWriter::new(&config.paths.whitelist, &config.paths.blacklist);
//!     let probe = Arc::new(HttpProbe::new(&config.probe)?);
//!     let pipeline = CheckPipeline::from_config(&config.probe, ledger, probe);
//!     pipeline.run(&catalog, &Selection::Rotation(RotationSelector::today())).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod checker;
pub mod config;
pub mod enrich;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::checker::{ConcurrentScheduler, HttpProbe, Probe, ProbeOutcome, QuorumEngine};
    pub use crate::config::Config;
    pub use crate::enrich::{BatchReport, Enricher, FfprobeMetadata, MetadataProbe};
    pub use crate::error::{Error, ErrorCategory, LivecheckErrorTrait, Result};
    pub use crate::models::{Catalog, Category, Source, StreamMetadata, Verdict, VerdictSet};
    pub use crate::pipeline::{CheckOutcome, CheckPipeline, Selection};
    pub use crate::scheduler::RotationSelector;
    pub use crate::storage::{BatchCursor, LedgerWriter};
}

// Direct re-exports for convenience
pub use models::{Catalog, Category, Source, Verdict, VerdictSet};
