//! Resumable batch cursor
//!
//! The cursor is an append-only log with one offset per line. The last line
//! is authoritative; earlier lines are history. Reading never fails: a
//! missing, empty or unreadable log means "start from the beginning".

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::utils::error::CursorError;

/// Cursor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No recorded offset yet
    Idle,
    /// Last recorded offset
    Advancing(usize),
}

impl CursorState {
    pub fn offset(&self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Advancing(offset) => *offset,
        }
    }
}

/// Persisted offset into the flattened catalog
#[derive(Debug, Clone)]
pub struct BatchCursor {
    path: PathBuf,
}

impl BatchCursor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state of the log
    pub fn state(&self) -> CursorState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CursorState::Idle,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cursor unreadable, starting from 0");
                return CursorState::Idle;
            }
        };

        let Some(last) = content.lines().map(str::trim).rev().find(|l| !l.is_empty()) else {
            return CursorState::Idle;
        };

        match last.parse::<usize>() {
            Ok(offset) => CursorState::Advancing(offset),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), line = %last, error = %e, "Invalid cursor entry, starting from 0");
                CursorState::Idle
            }
        }
    }

    /// Last recorded offset, or 0
    pub fn read(&self) -> usize {
        self.state().offset()
    }

    /// Record `end_index` as the new authoritative offset
    pub fn advance(&self, end_index: usize) -> Result<(), CursorError> {
        let write_err = |source| CursorError::Write {
            path: self.path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{end_index}").map_err(write_err)?;
        writer.flush().map_err(write_err)?;
        writer.get_ref().sync_data().map_err(write_err)?;

        tracing::debug!(path = %self.path.display(), offset = end_index, "Cursor advanced");
        Ok(())
    }

    /// Every recorded offset, oldest first (unparsable lines are skipped)
    pub fn history(&self) -> Vec<usize> {
        std::fs::read_to_string(&self.path)
            .ok()
            .map(|content| {
                content
                    .lines()
                    .filter_map(|l| l.trim().parse::<usize>().ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}
