//! Liveness checking
//!
//! This module implements the probing side of livecheck:
//!
//! - [`Probe`] - one reachability attempt against one address
//! - [`HttpProbe`] - the network implementation of [`Probe`]
//! - [`quorum`] - N sequential attempts reduced to one verdict by majority vote
//! - [`scheduler`] - bounded-concurrency evaluation of a whole category
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use livecheck::checker::{ConcurrentScheduler, HttpProbe, QuorumEngine};
//! use livecheck::config::Config;
//! use livecheck::models::Category;
//!
//! # async fn example(category: Category) -> anyhow::Result<()> {
//! let config = Config::default();
//! let probe = Arc::new(HttpProbe::new(&config.probe)?);
//! let scheduler = ConcurrentScheduler::new(
//!     config.probe.worker_budget,
//!     QuorumEngine::from_config(&config.probe),
//! );
//! let verdicts = scheduler.run(&category, probe).await;
//! println!("{} alive", verdicts.alive().count());
//! # Ok(())
//! # }
//! ```

pub mod headers;
pub mod quorum;
pub mod scheduler;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

use crate::config::ProbeConfig;
use crate::utils::error::ProbeError;
use crate::utils::{address_host, has_address};

pub use quorum::{QuorumEngine, QuorumOutcome};
pub use scheduler::{ConcurrentScheduler, ProbeStats};

/// Result of a successful probe attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Time until the response status arrived
    pub latency: Duration,
}

/// Single reachability check against one address
///
/// Implement this trait to plug in another network client or a deterministic
/// stub for tests.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe name for logging
    fn name(&self) -> &str;

    /// Perform one attempt bounded by `timeout`
    async fn attempt(&self, address: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError>;
}

/// HTTP GET probe: an address is reachable when it answers `200 OK`
pub struct HttpProbe {
    /// HTTP client shared by all attempts
    client: Client,

    /// Rotate browser User-Agent strings per attempt
    rotate_user_agent: bool,
}

impl HttpProbe {
    /// Create a probe from the probing configuration
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Http` if the HTTP client cannot be created
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .connect_timeout(config.per_attempt_timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            rotate_user_agent: config.user_agent_rotation,
        })
    }

    fn user_agent(&self) -> String {
        if self.rotate_user_agent {
            headers::random_user_agent().to_string()
        } else {
            headers::default_user_agent()
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> &str {
        "http"
    }

    async fn attempt(&self, address: &str, timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        if !has_address(address) {
            return Err(ProbeError::InvalidAddress(address.to_string()));
        }

        let started = Instant::now();
        let response = self
            .client
            .get(address)
            .headers(headers::build_probe_headers(&self.user_agent()))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout
                } else {
                    ProbeError::Http(e)
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::trace!(host = ?address_host(address), status = status.as_u16(), "Non-OK status");
            return Err(ProbeError::Status(status.as_u16()));
        }

        Ok(ProbeOutcome {
            latency: started.elapsed(),
        })
    }
}
