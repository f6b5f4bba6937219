//! Persistence for check and enrichment runs
//!
//! - [`ledger`] - append-only whitelist/blacklist ledgers
//! - [`cursor`] - append-only offset log for resumable enrichment
//!
//! All writes are appends by a single writer per run. Concurrent invocations
//! against the same files must be serialized by the caller.

pub mod cursor;
pub mod ledger;

pub use cursor::{BatchCursor, CursorState};
pub use ledger::{LedgerReport, LedgerWriter};
