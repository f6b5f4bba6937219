use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;

use livecheck::catalog::load_catalog;
use livecheck::checker::HttpProbe;
use livecheck::config::Config;
use livecheck::error::LivecheckErrorTrait;
use livecheck::pipeline::{CheckOutcome, CheckPipeline, Selection};
use livecheck::scheduler::RotationSelector;
use livecheck::storage::LedgerWriter;
use livecheck::utils::truncate_address;

pub async fn check(config: &Config, category: Option<String>, date: Option<NaiveDate>) -> Result<()> {
    config.ensure_layout()?;
    let catalog = load_catalog(&config.paths.catalog).context("Failed to load catalog")?;

    let selection = match (category, date) {
        (Some(name), _) => Selection::Named(name),
        (None, Some(date)) => Selection::Rotation(RotationSelector::for_date(date)),
        (None, None) => Selection::Rotation(RotationSelector::today()),
    };

    let probe = Arc::new(HttpProbe::new(&config.probe).context("Failed to create HTTP probe")?);
    let ledger = LedgerWriter::new(&config.paths.whitelist, &config.paths.blacklist);
    let pipeline = CheckPipeline::from_config(&config.probe, ledger, probe);

    let outcome = pipeline.run(&catalog, &selection).await.inspect_err(|e| {
        tracing::error!(
            error_category = e.category().as_str(),
            recoverable = e.is_recoverable(),
            error = %e,
            "Check run failed"
        );
    })?;

    match outcome {
        CheckOutcome::NoCategory => {
            println!("No categories to check.");
        }
        CheckOutcome::UnknownCategory(name) => {
            anyhow::bail!("Category not found in catalog: {name}");
        }
        CheckOutcome::Checked {
            category,
            verdicts,
            report,
            stats,
        } => {
            println!("Checked category: {category}");
            println!("=================");
            for verdict in verdicts.iter() {
                println!(
                    "  {verdict} {}",
                    truncate_address(&verdict.source.address, 60)
                );
            }
            println!();
            println!("  Sources checked: {}", stats.total);
            println!("  Alive: {} ({:.1}%)", stats.alive, stats.alive_ratio());
            println!("  Dead: {}", stats.dead);
            if stats.failed > 0 {
                println!("  Evaluation failures: {}", stats.failed);
            }
            println!(
                "  Whitelisted {} / blacklisted {} at {}",
                report.whitelisted, report.blacklisted, report.timestamp
            );
        }
    }

    Ok(())
}
