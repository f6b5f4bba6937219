//! Configuration management for livecheck
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments. Each component receives its own section at
//! construction time.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::retry::BackoffPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Liveness probing configuration
    pub probe: ProbeConfig,

    /// Metadata enrichment configuration
    pub enrich: EnrichConfig,

    /// Input and output file locations
    pub paths: PathsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Liveness probing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum number of sources evaluated at once
    pub worker_budget: usize,

    /// Probe attempts per source (majority vote)
    pub attempts_per_source: u32,

    /// Timeout of a single attempt in seconds
    pub per_attempt_timeout_secs: u64,

    /// Delay before the second attempt in milliseconds
    pub retry_delay_ms: u64,

    /// Growth factor of the delay for later attempts
    pub retry_backoff_multiplier: f64,

    /// Rotate browser User-Agent strings between requests
    pub user_agent_rotation: bool,
}

/// Metadata enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Catalog lines processed per run
    pub batch_size: usize,

    /// Timeout of a metadata probe in seconds
    pub probe_timeout_secs: u64,

    /// Lines probed at once within a batch
    pub concurrency: usize,

    /// ffprobe executable used for stream dimensions
    pub ffprobe_path: String,
}

/// File locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Catalog of categories and sources
    pub catalog: PathBuf,

    /// Ledger of reachable sources
    pub whitelist: PathBuf,

    /// Ledger of unreachable sources
    pub blacklist: PathBuf,

    /// Append-only log of enrichment offsets
    pub cursor: PathBuf,

    /// Enriched catalog output
    pub enriched_output: PathBuf,

    /// Working directory for run artifacts
    pub results_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            worker_budget: 20,
            attempts_per_source: 2,
            per_attempt_timeout_secs: 3,
            retry_delay_ms: 0,
            retry_backoff_multiplier: 1.0,
            user_agent_rotation: true,
        }
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            probe_timeout_secs: 6,
            concurrency: 4,
            ffprobe_path: String::from("ffprobe"),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("./merged_output.txt"),
            whitelist: PathBuf::from("./live_white_list.txt"),
            blacklist: PathBuf::from("./live_black_list.txt"),
            cursor: PathBuf::from("./processed_index.txt"),
            enriched_output: PathBuf::from("./test_merged_output.txt"),
            results_dir: PathBuf::from("./live_results"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let probe = ProbeConfig {
            worker_budget: env_parse("LIVECHECK_WORKER_BUDGET")
                .unwrap_or(defaults.probe.worker_budget),
            attempts_per_source: env_parse("LIVECHECK_ATTEMPTS_PER_SOURCE")
                .unwrap_or(defaults.probe.attempts_per_source),
            per_attempt_timeout_secs: env_parse("LIVECHECK_PER_ATTEMPT_TIMEOUT")
                .unwrap_or(defaults.probe.per_attempt_timeout_secs),
            retry_delay_ms: env_parse("LIVECHECK_RETRY_DELAY_MS")
                .unwrap_or(defaults.probe.retry_delay_ms),
            retry_backoff_multiplier: env_parse("LIVECHECK_RETRY_BACKOFF_MULTIPLIER")
                .unwrap_or(defaults.probe.retry_backoff_multiplier),
            user_agent_rotation: env_parse("LIVECHECK_USER_AGENT_ROTATION")
                .unwrap_or(defaults.probe.user_agent_rotation),
        };

        let enrich = EnrichConfig {
            batch_size: env_parse("LIVECHECK_BATCH_SIZE").unwrap_or(defaults.enrich.batch_size),
            probe_timeout_secs: env_parse("LIVECHECK_ENRICH_TIMEOUT")
                .unwrap_or(defaults.enrich.probe_timeout_secs),
            concurrency: env_parse("LIVECHECK_ENRICH_CONCURRENCY")
                .unwrap_or(defaults.enrich.concurrency),
            ffprobe_path: std::env::var("LIVECHECK_FFPROBE")
                .unwrap_or(defaults.enrich.ffprobe_path),
        };

        let path = |key: &str, default: PathBuf| -> PathBuf {
            std::env::var(key).map(PathBuf::from).unwrap_or(default)
        };

        let paths = PathsConfig {
            catalog: path("LIVECHECK_CATALOG", defaults.paths.catalog),
            whitelist: path("LIVECHECK_WHITELIST", defaults.paths.whitelist),
            blacklist: path("LIVECHECK_BLACKLIST", defaults.paths.blacklist),
            cursor: path("LIVECHECK_CURSOR", defaults.paths.cursor),
            enriched_output: path("LIVECHECK_ENRICHED_OUTPUT", defaults.paths.enriched_output),
            results_dir: path("LIVECHECK_RESULTS_DIR", defaults.paths.results_dir),
        };

        let logging = LoggingConfig {
            level: std::env::var("LIVECHECK_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: std::env::var("LIVECHECK_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Ok(Self {
            probe,
            enrich,
            paths,
            logging,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.probe.worker_budget == 0 {
            anyhow::bail!("worker_budget must be greater than 0");
        }

        if self.probe.attempts_per_source == 0 {
            anyhow::bail!("attempts_per_source must be greater than 0");
        }

        if self.probe.per_attempt_timeout_secs == 0 {
            anyhow::bail!("per_attempt_timeout_secs must be greater than 0");
        }

        if self.probe.retry_backoff_multiplier < 1.0 {
            anyhow::bail!("retry_backoff_multiplier must be at least 1.0");
        }

        if self.enrich.batch_size == 0 {
            anyhow::bail!("batch_size must be greater than 0");
        }

        if self.enrich.concurrency == 0 {
            anyhow::bail!("enrich concurrency must be greater than 0");
        }

        Ok(())
    }

    /// Create the results directory and empty input/output files if absent.
    ///
    /// Existing files are left untouched.
    pub fn ensure_layout(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.results_dir).with_context(|| {
            format!(
                "Failed to create results directory: {}",
                self.paths.results_dir.display()
            )
        })?;

        for file in [
            &self.paths.catalog,
            &self.paths.whitelist,
            &self.paths.blacklist,
        ] {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .with_context(|| format!("Failed to create file: {}", file.display()))?;
        }

        Ok(())
    }
}

impl ProbeConfig {
    /// Per-attempt timeout as Duration
    #[must_use]
    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.per_attempt_timeout_secs)
    }

    /// Backoff between attempts of one source
    #[must_use]
    pub fn backoff(&self) -> BackoffPolicy {
        if self.retry_backoff_multiplier > 1.0 {
            // Cap growth at the per-attempt timeout so a retry never waits longer than an attempt
            let cap = self.per_attempt_timeout_secs.saturating_mul(1000);
            BackoffPolicy::exponential(self.retry_delay_ms, cap, self.retry_backoff_multiplier)
        } else {
            BackoffPolicy::fixed(self.retry_delay_ms)
        }
    }
}

impl EnrichConfig {
    /// Metadata probe timeout as Duration
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
