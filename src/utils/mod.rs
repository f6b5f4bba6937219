//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;
pub mod retry;

use url::Url;

/// Marker that ends a category header line in the catalog
pub const GENRE_MARKER: &str = "#genre#";

/// Whether a line is a category header
pub fn is_category_header(line: &str) -> bool {
    line.trim_end().ends_with(GENRE_MARKER)
}

/// Whether the text looks like a probe-able address (`scheme://...`)
pub fn has_address(text: &str) -> bool {
    text.contains("://")
}

/// Extract the host from an address for log fields
pub fn address_host(address: &str) -> Option<String> {
    Url::parse(address)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Truncate an address for progress output
pub fn truncate_address(address: &str, max_len: usize) -> String {
    if address.chars().count() <= max_len {
        address.to_string()
    } else {
        let truncated: String = address.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
