//! Catalog loading
//!
//! Line-oriented parser for the catalog text format:
//!
//! ```text
//! News,#genre#
//! CNN,http://a
//! BBC,http://b
//! ```
//!
//! Malformed lines are skipped, never fatal.

use std::path::Path;

use crate::models::{Catalog, Source};
use crate::utils::error::CatalogError;
use crate::utils::{is_category_header, GENRE_MARKER};

/// Derive the category label from a header line (`News,#genre#` -> `News`)
pub fn category_label(header: &str) -> String {
    let label = header
        .trim()
        .trim_end_matches(GENRE_MARKER)
        .trim_end()
        .trim_end_matches(',')
        .trim();

    if label.is_empty() {
        header.trim().to_string()
    } else {
        label.to_string()
    }
}

/// Split a source line on its first comma into a source.
///
/// Returns `None` unless both name and address are non-empty.
pub fn parse_source_line(line: &str) -> Option<Source> {
    let (name, address) = line.split_once(',')?;
    let (name, address) = (name.trim(), address.trim());
    if name.is_empty() || address.is_empty() {
        return None;
    }
    Some(Source::new(name, address))
}

/// Parse catalog text into categories
pub fn parse_catalog(text: &str) -> Catalog {
    let mut catalog = Catalog::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if is_category_header(line) {
            let label = category_label(line);
            catalog.open_category(&label, line);
            current = Some(label);
            continue;
        }

        let Some(label) = current.as_deref() else {
            tracing::trace!(line = %line, "Skipping source line outside any category");
            continue;
        };

        match parse_source_line(line) {
            Some(source) => {
                if let Some(category) = catalog.get_mut(label) {
                    category.sources.push(source);
                }
            }
            None => tracing::trace!(line = %line, "Skipping malformed catalog line"),
        }
    }

    catalog
}

/// Load and parse a catalog file
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&text);
    tracing::debug!(
        path = %path.display(),
        categories = catalog.len(),
        sources = catalog.source_count(),
        "Catalog loaded"
    );
    Ok(catalog)
}

/// Read the catalog as a flat sequence of trimmed lines.
///
/// Unlike an empty catalog, a missing or unreadable file is an error, so
/// callers never mistake a failed read for an exhausted catalog.
pub fn read_flat_lines(path: &Path) -> Result<Vec<String>, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.lines().map(|l| l.trim().to_string()).collect())
}
