//! Resumable metadata enrichment
//!
//! Each run takes the next slice of the flattened catalog, starting at the
//! offset recorded by the [`BatchCursor`]:
//!
//! ```text
//! offset = cursor.read()
//! slice  = lines[offset .. min(offset + batch_size, total)]
//! ```
//!
//! Source lines get `,<width>x<height>,<elapsed_seconds>` appended when the
//! metadata probe succeeds; headers, address-less lines and failed probes are
//! copied unchanged. The slice is appended to the enriched output and only
//! then is the cursor advanced to the slice end, even when the slice is empty.
//!
//! The recorded offset never decreases. When it lies past the end of the
//! catalog (the catalog shrank), the run writes nothing and leaves the cursor
//! where it is.

pub mod metadata;

use futures::stream::{self, StreamExt};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::EnrichConfig;
use crate::error::Result;
use crate::models::Source;
use crate::storage::BatchCursor;
use crate::utils::error::CursorError;
use crate::utils::{has_address, GENRE_MARKER};

pub use metadata::{FfprobeMetadata, MetadataProbe};

/// How a catalog line is treated during enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Category header, copied unchanged
    Header,
    /// No recognizable source, copied unchanged
    PassThrough,
    /// `name,address` pair to probe
    Entry(Source),
}

/// Classify a flattened catalog line
pub fn classify_line(line: &str) -> LineKind {
    if line.contains(GENRE_MARKER) {
        return LineKind::Header;
    }
    if !has_address(line) {
        return LineKind::PassThrough;
    }

    let fields: Vec<&str> = line.split(',').collect();
    match fields.as_slice() {
        [name, address] if !name.trim().is_empty() && !address.trim().is_empty() => {
            LineKind::Entry(Source::new(name.trim(), address.trim()))
        }
        _ => LineKind::PassThrough,
    }
}

/// Half-open slice to process: `[offset, max(offset, min(offset + batch_size, total)))`.
///
/// The range never starts before `offset`; an offset past `total` yields an
/// empty range at `offset`.
pub fn batch_range(offset: usize, batch_size: usize, total: usize) -> Range<usize> {
    let end = offset.saturating_add(batch_size).min(total).max(offset);
    offset..end
}

/// Outcome of one enrichment run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub start: usize,
    pub end: usize,
    pub total: usize,

    /// Lines written with metadata appended
    pub enriched: usize,

    /// Headers and address-less lines
    pub passed_through: usize,

    /// Source lines whose metadata probe failed (written unchanged)
    pub failed: usize,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.end - self.start
    }

    /// The cursor has reached the end of the catalog
    pub fn is_exhausted(&self) -> bool {
        self.end >= self.total
    }
}

enum LineOutcome {
    Enriched,
    PassedThrough,
    Failed,
}

/// Processes one catalog slice per run and advances the cursor
pub struct Enricher {
    cursor: BatchCursor,
    output: PathBuf,
    batch_size: usize,
    concurrency: usize,
    timeout: Duration,
    probe: Arc<dyn MetadataProbe>,
}

impl Enricher {
    pub fn new(
        config: &EnrichConfig,
        cursor: BatchCursor,
        output: impl Into<PathBuf>,
        probe: Arc<dyn MetadataProbe>,
    ) -> Self {
        Self {
            cursor,
            output: output.into(),
            batch_size: config.batch_size.max(1),
            concurrency: config.concurrency.max(1),
            timeout: config.probe_timeout(),
            probe,
        }
    }

    pub fn cursor(&self) -> &BatchCursor {
        &self.cursor
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Process the next slice of `lines`.
    ///
    /// # Errors
    ///
    /// Fails only when the enriched output or the cursor cannot be written.
    /// In that case the cursor is not advanced.
    pub async fn run(&self, lines: &[String]) -> Result<BatchReport> {
        let total = lines.len();
        let offset = self.cursor.read();

        if offset > total {
            tracing::warn!(
                offset,
                total,
                cursor = %self.cursor.path().display(),
                "Cursor is past the end of the catalog, leaving it unchanged"
            );
            return Ok(BatchReport {
                start: offset,
                end: offset,
                total,
                ..Default::default()
            });
        }

        let range = batch_range(offset, self.batch_size, total);

        tracing::info!(
            start = range.start,
            end = range.end,
            total,
            probe = self.probe.name(),
            "Enriching catalog slice"
        );

        // Order-preserving: output lines follow input order
        let results: Vec<(String, LineOutcome)> = stream::iter(&lines[range.clone()])
            .map(|line| self.process_line(line))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = BatchReport {
            start: range.start,
            end: range.end,
            total,
            ..Default::default()
        };
        for (_, outcome) in &results {
            match outcome {
                LineOutcome::Enriched => report.enriched += 1,
                LineOutcome::PassedThrough => report.passed_through += 1,
                LineOutcome::Failed => report.failed += 1,
            }
        }

        self.append_output(results.iter().map(|(line, _)| line.as_str()))?;
        self.cursor.advance(range.end)?;

        tracing::info!(
            enriched = report.enriched,
            passed_through = report.passed_through,
            failed = report.failed,
            offset = range.end,
            exhausted = report.is_exhausted(),
            "Enrichment batch complete"
        );

        Ok(report)
    }

    async fn process_line(&self, line: &str) -> (String, LineOutcome) {
        let source = match classify_line(line) {
            LineKind::Entry(source) => source,
            LineKind::Header | LineKind::PassThrough => {
                return (line.to_string(), LineOutcome::PassedThrough)
            }
        };

        match self.probe.probe(&source.address, self.timeout).await {
            Ok(metadata) => (
                format!("{line}{}", metadata.line_suffix()),
                LineOutcome::Enriched,
            ),
            Err(e) => {
                tracing::warn!(source = %source.name, address = %source.address, error = %e, "Metadata probe failed");
                (line.to_string(), LineOutcome::Failed)
            }
        }
    }

    fn append_output<'a>(&self, lines: impl Iterator<Item = &'a str>) -> Result<()> {
        let output_err = |source| CursorError::Output {
            path: self.output.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output)
            .map_err(output_err)?;

        let mut writer = BufWriter::new(file);
        for line in lines {
            writeln!(writer, "{line}").map_err(output_err)?;
        }
        writer.flush().map_err(output_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("News,#genre#"), LineKind::Header);
        assert_eq!(classify_line(""), LineKind::PassThrough);
        assert_eq!(classify_line("CNN,local-file"), LineKind::PassThrough);
        assert_eq!(
            classify_line("CNN,http://a"),
            LineKind::Entry(Source::new("CNN", "http://a"))
        );
        assert_eq!(classify_line("CNN,http://a,extra"), LineKind::PassThrough);
        assert_eq!(classify_line("http://a"), LineKind::PassThrough);
    }

    #[test]
    fn test_batch_range() {
        assert_eq!(batch_range(0, 100, 250), 0..100);
        assert_eq!(batch_range(200, 100, 250), 200..250);
        assert_eq!(batch_range(250, 100, 250), 250..250);
        assert_eq!(batch_range(400, 100, 250), 400..400);
        assert_eq!(batch_range(usize::MAX, 100, 10), usize::MAX..usize::MAX);
    }

    #[test]
    fn test_batch_range_never_starts_before_offset() {
        for offset in [0, 99, 100, 250, 251, 1000] {
            for total in [0, 50, 250] {
                let range = batch_range(offset, 100, total);
                assert_eq!(range.start, offset);
                assert!(range.end >= offset);
                assert!(range.end <= total.max(offset));
            }
        }
    }

    #[test]
    fn test_report_exhaustion() {
        let report = BatchReport {
            start: 200,
            end: 250,
            total: 250,
            ..Default::default()
        };
        assert!(report.is_exhausted());
        assert_eq!(report.processed(), 50);
    }
}
