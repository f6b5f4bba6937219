use anyhow::{Context, Result};
use std::sync::Arc;

use livecheck::catalog::read_flat_lines;
use livecheck::config::Config;
use livecheck::error::LivecheckErrorTrait;
use livecheck::enrich::{batch_range, Enricher, FfprobeMetadata};
use livecheck::storage::{BatchCursor, CursorState};

pub async fn enrich(config: &Config) -> Result<()> {
    let lines = read_flat_lines(&config.paths.catalog).context("Failed to read catalog")?;
    let probe = Arc::new(
        FfprobeMetadata::new(&config.enrich.ffprobe_path)
            .context("Failed to create metadata probe")?,
    );
    let enricher = Enricher::new(
        &config.enrich,
        BatchCursor::new(&config.paths.cursor),
        &config.paths.enriched_output,
        probe,
    );

    let report = enricher
        .run(&lines)
        .await
        .inspect_err(|e| {
            tracing::error!(
                error_category = e.category().as_str(),
                recoverable = e.is_recoverable(),
                error = %e,
                "Enrichment batch not persisted"
            );
        })
        .context("Failed to persist enrichment batch")?;

    println!("Enrichment batch [{}, {})", report.start, report.end);
    println!("  Enriched: {}", report.enriched);
    println!("  Passed through: {}", report.passed_through);
    println!("  Probe failures: {}", report.failed);
    println!("  Output: {}", enricher.output_path().display());
    if report.is_exhausted() {
        println!("  Catalog exhausted ({} lines)", report.total);
    } else {
        println!("  Progress: {}/{}", report.end, report.total);
    }

    Ok(())
}

pub fn cursor(config: &Config) -> Result<()> {
    let cursor = BatchCursor::new(&config.paths.cursor);
    let total = read_flat_lines(&config.paths.catalog)
        .context("Failed to read catalog")?
        .len();
    let offset = cursor.read();
    let next = batch_range(offset, config.enrich.batch_size, total);

    match cursor.state() {
        CursorState::Idle => println!("Cursor: not started"),
        CursorState::Advancing(offset) => println!("Cursor: {offset}"),
    }
    println!("  Catalog lines: {total}");
    println!("  Recorded runs: {}", cursor.history().len());
    if offset > total {
        println!("  Next batch: none (cursor past the end of the catalog)");
    } else if next.is_empty() {
        println!("  Next batch: none (catalog exhausted)");
    } else {
        println!("  Next batch: [{}, {})", next.start, next.end);
    }

    Ok(())
}
