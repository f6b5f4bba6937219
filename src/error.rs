//! Crate-level error type
//!
//! Domain errors live in [`crate::utils::error`]; [`Error`] wraps them for
//! library entry points that can fail (catalog loading, ledger appends,
//! enrichment batches). [`LivecheckErrorTrait`] tells callers whether a
//! failure is worth retrying and which subsystem produced it.
//!
//! Probe errors never leave a single source's evaluation. Storage errors
//! (ledger, cursor, enriched output) end the run.

use thiserror::Error;

pub use crate::utils::error::{CatalogError, CursorError, LedgerError, ProbeError};

/// Retry and classification hooks shared by livecheck errors
pub trait LivecheckErrorTrait: std::error::Error {
    /// Whether running again may succeed without operator action
    fn is_recoverable(&self) -> bool;

    /// Subsystem the error came from
    fn category(&self) -> ErrorCategory;
}

/// Subsystem that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// HTTP, ffprobe, timeouts, bad status
    Network,
    /// Catalog reading
    Parsing,
    /// Ledger, cursor and enriched output files
    Storage,
    /// Evaluation task died
    Scheduler,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Scheduler => "scheduler",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// Only surfaced when an address is probed outside the quorum engine
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl LivecheckErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Probe(e) => e.is_recoverable(),
            Self::Ledger(_) | Self::Cursor(_) | Self::Catalog(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Probe(ProbeError::TaskFailed(_)) => ErrorCategory::Scheduler,
            Self::Probe(_) => ErrorCategory::Network,
            Self::Ledger(_) | Self::Cursor(_) => ErrorCategory::Storage,
            Self::Catalog(_) => ErrorCategory::Parsing,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
