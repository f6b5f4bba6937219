//! Error types for livecheck
//!
//! This module defines the domain error types used throughout the application.
//! Probe errors are absorbed per attempt; storage errors are fatal to a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a single probe attempt
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Attempt exceeded its timeout
    #[error("Probe timeout")]
    Timeout,

    /// Address is not something we can probe
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Stream metadata could not be read
    #[error("Metadata probe failed: {0}")]
    Metadata(String),

    /// Evaluation task died before producing a verdict
    #[error("Probe task failed: {0}")]
    TaskFailed(String),
}

impl ProbeError {
    /// Transient failures may pass on a later attempt
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::TaskFailed(_) => true,
            Self::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::InvalidAddress(_) | Self::Metadata(_) => false,
        }
    }
}

/// Errors while appending to the whitelist/blacklist ledgers
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to open ledger {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to append to ledger {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors while persisting the batch cursor or enriched output
#[derive(Error, Debug)]
pub enum CursorError {
    #[error("Failed to record cursor offset in {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to append enriched output to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors while loading the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
