//! Append-only whitelist/blacklist ledgers
//!
//! Each check run appends one section per ledger:
//!
//! ```text
//! News (检测时间: 2024-03-01 08:00:00)
//! CNN,http://a
//! ```
//!
//! Prior content is never read, rewritten or truncated, so probing the same
//! category on different days accumulates timestamped sections.

use chrono::NaiveDateTime;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::{Verdict, VerdictSet};
use crate::utils::error::LedgerError;

/// Timestamp layout used in section headers
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Section header line for a category at a point in time
pub fn section_header(category: &str, at: NaiveDateTime) -> String {
    format!("{category} (检测时间: {})", at.format(TIMESTAMP_FORMAT))
}

/// Outcome of one ledger append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReport {
    pub category: String,
    pub timestamp: String,
    pub whitelisted: usize,
    pub blacklisted: usize,
}

/// Appends verdict sections to the whitelist and blacklist files
#[derive(Debug, Clone)]
pub struct LedgerWriter {
    whitelist: PathBuf,
    blacklist: PathBuf,
}

impl LedgerWriter {
    pub fn new(whitelist: impl Into<PathBuf>, blacklist: impl Into<PathBuf>) -> Self {
        Self {
            whitelist: whitelist.into(),
            blacklist: blacklist.into(),
        }
    }

    pub fn whitelist_path(&self) -> &Path {
        &self.whitelist
    }

    pub fn blacklist_path(&self) -> &Path {
        &self.blacklist
    }

    /// Append sections stamped with the current local time
    pub fn append(&self, category: &str, verdicts: &VerdictSet) -> Result<LedgerReport, LedgerError> {
        self.append_at(category, verdicts, chrono::Local::now().naive_local())
    }

    /// Append one section to each ledger: alive verdicts to the whitelist,
    /// the rest to the blacklist. Both sections carry the same timestamp and
    /// are written even when empty.
    pub fn append_at(
        &self,
        category: &str,
        verdicts: &VerdictSet,
        at: NaiveDateTime,
    ) -> Result<LedgerReport, LedgerError> {
        let header = section_header(category, at);

        let whitelisted = append_section(&self.whitelist, &header, verdicts.alive())?;
        let blacklisted = append_section(&self.blacklist, &header, verdicts.dead())?;

        tracing::info!(
            category = %category,
            whitelisted,
            blacklisted,
            whitelist = %self.whitelist.display(),
            blacklist = %self.blacklist.display(),
            "Ledger sections appended"
        );

        Ok(LedgerReport {
            category: category.to_string(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            whitelisted,
            blacklisted,
        })
    }
}

fn append_section<'a>(
    path: &Path,
    header: &str,
    verdicts: impl Iterator<Item = &'a Verdict>,
) -> Result<usize, LedgerError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LedgerError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let write_err = |source| LedgerError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(file);
    writeln!(writer, "{header}").map_err(write_err)?;

    let mut count = 0;
    for verdict in verdicts {
        writeln!(writer, "{}", verdict.source.to_line()).map_err(write_err)?;
        count += 1;
    }

    writer.flush().map_err(write_err)?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn verdicts(entries: &[(&str, &str, bool)]) -> VerdictSet {
        let mut set = VerdictSet::new();
        for (name, address, alive) in entries {
            set.insert(Verdict {
                source: Source::new(*name, *address),
                alive: *alive,
                latency: None,
                successes: u32::from(*alive),
                attempts: 1,
                last_error: None,
            });
        }
        set
    }

    #[test]
    fn test_section_header() {
        assert_eq!(section_header("News", at(8)), "News (检测时间: 2024-03-01 08:00:00)");
    }

    #[test]
    fn test_routes_verdicts() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LedgerWriter::new(dir.path().join("white.txt"), dir.path().join("black.txt"));

        let report = writer
            .append_at(
                "News",
                &verdicts(&[("CNN", "http://a", true), ("BBC", "http://b", false)]),
                at(8),
            )
            .unwrap();

        assert_eq!(report.whitelisted, 1);
        assert_eq!(report.blacklisted, 1);
        assert_eq!(
            std::fs::read_to_string(writer.whitelist_path()).unwrap(),
            "News (检测时间: 2024-03-01 08:00:00)\nCNN,http://a\n"
        );
        assert_eq!(
            std::fs::read_to_string(writer.blacklist_path()).unwrap(),
            "News (检测时间: 2024-03-01 08:00:00)\nBBC,http://b\n"
        );
    }

    #[test]
    fn test_appends_never_replace() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LedgerWriter::new(dir.path().join("white.txt"), dir.path().join("black.txt"));
        let set = verdicts(&[("CNN", "http://a", true)]);

        writer.append_at("News", &set, at(8)).unwrap();
        writer.append_at("News", &set, at(9)).unwrap();

        let content = std::fs::read_to_string(writer.whitelist_path()).unwrap();
        assert_eq!(content.matches("News (检测时间:").count(), 2);
        assert_eq!(content.matches("CNN,http://a").count(), 2);
        assert!(content.starts_with("News (检测时间: 2024-03-01 08:00:00)\n"));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LedgerWriter::new(
            dir.path().join("missing/white.txt"),
            dir.path().join("black.txt"),
        );
        let result = writer.append_at("News", &verdicts(&[]), at(8));
        assert!(matches!(result, Err(LedgerError::Open { .. })));
    }
}
