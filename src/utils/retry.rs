//! Backoff between attempts of a single source
//!
//! The delay applies only between sequential attempts against one address. It
//! is independent of how many sources are evaluated concurrently.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay schedule between sequential probe attempts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Delay before the second attempt in milliseconds (0 disables backoff)
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,

    /// Multiplier applied per further attempt (1.0 keeps the delay fixed)
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl BackoffPolicy {
    /// Attempts run back to back
    pub fn none() -> Self {
        Self {
            base_delay_ms: 0,
            max_delay_ms: 0,
            multiplier: 1.0,
        }
    }

    /// Same delay before every retry
    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            multiplier: 1.0,
        }
    }

    /// Exponential backoff capped at `max_delay_ms`
    pub fn exponential(base_delay_ms: u64, max_delay_ms: u64, multiplier: f64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
            multiplier,
        }
    }

    /// Delay to wait before the given 0-based attempt
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 || self.base_delay_ms == 0 {
            0
        } else {
            let exponential = self.base_delay_ms as f64 * self.multiplier.powi((attempt - 1) as i32);
            (exponential as u64).min(self.max_delay_ms.max(self.base_delay_ms))
        };

        Duration::from_millis(delay_ms)
    }
}
