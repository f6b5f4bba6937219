use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use livecheck::config::Config;

mod commands;

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "livecheck.toml";

#[derive(Parser)]
#[command(
    name = "livecheck",
    version,
    about = "Liveness checker and metadata enricher for live source catalogs",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); defaults to ./livecheck.toml, then environment
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe today's category and append the results to the ledgers
    Check {
        /// Probe this category instead of today's rotation pick
        #[arg(long)]
        category: Option<String>,

        /// Pick the rotation category for this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,

        /// Maximum number of sources probed at once
        #[arg(short, long)]
        workers: Option<usize>,

        /// Probe attempts per source
        #[arg(short, long)]
        attempts: Option<u32>,

        /// Per-attempt timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Enrich the next batch of catalog lines with stream metadata
    Enrich {
        /// Catalog lines processed in this run
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Show enrichment progress
    Cursor,

    /// Create the results directory and empty catalog/ledger files
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    tracing::info!("livecheck starting");

    match cli.command {
        Commands::Check {
            category,
            date,
            workers,
            attempts,
            timeout,
        } => {
            if let Some(workers) = workers {
                config.probe.worker_budget = workers;
            }
            if let Some(attempts) = attempts {
                config.probe.attempts_per_source = attempts;
            }
            if let Some(timeout) = timeout {
                config.probe.per_attempt_timeout_secs = timeout;
            }
            config.validate().context("Invalid configuration")?;

            tracing::info!(
                category = ?category,
                date = ?date,
                worker_budget = config.probe.worker_budget,
                attempts = config.probe.attempts_per_source,
                timeout_secs = config.probe.per_attempt_timeout_secs,
                "Starting check command"
            );
            commands::check(&config, category, date).await?;
        }

        Commands::Enrich { batch_size } => {
            if let Some(batch_size) = batch_size {
                config.enrich.batch_size = batch_size;
            }
            config.validate().context("Invalid configuration")?;

            tracing::info!(batch_size = config.enrich.batch_size, "Starting enrich command");
            commands::enrich(&config).await?;
        }

        Commands::Cursor => {
            commands::cursor(&config)?;
        }

        Commands::Init => {
            commands::init(&config)?;
        }
    }

    tracing::info!("livecheck completed successfully");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::from_file(Path::new(DEFAULT_CONFIG_FILE))
        }
        None => Config::from_env(),
    }
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("livecheck=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("livecheck={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
