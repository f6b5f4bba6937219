// Core data structures for livecheck

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

/// One named, addressable media endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub address: String,
}

impl Source {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Render as a `name,address` catalog line
    pub fn to_line(&self) -> String {
        format!("{},{}", self.name, self.address)
    }
}

/// Named group of sources sharing a catalog label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Label used for rotation and ledger section headers (e.g. `News`)
    pub id: String,

    /// Header line exactly as it appeared in the catalog (e.g. `News,#genre#`)
    pub header: String,

    /// Sources in catalog order
    pub sources: Vec<Source>,
}

impl Category {
    pub fn new(id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            sources: Vec::new(),
        }
    }
}

/// In-memory catalog: categories in load order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a category block for appending sources.
    ///
    /// A repeated identifier keeps its original position but its source list is
    /// restarted, so the later block overwrites the earlier one.
    pub fn open_category(&mut self, id: &str, header: &str) -> &mut Category {
        let index = match self.categories.iter().position(|c| c.id == id) {
            Some(index) => {
                let existing = &mut self.categories[index];
                existing.header = header.to_string();
                existing.sources.clear();
                index
            }
            None => {
                self.categories.push(Category::new(id, header));
                self.categories.len() - 1
            }
        };
        &mut self.categories[index]
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }

    /// Category identifiers in load order
    pub fn ids(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of sources across all categories
    pub fn source_count(&self) -> usize {
        self.categories.iter().map(|c| c.sources.len()).sum()
    }
}

/// Stream dimensions and probe latency reported by the metadata probe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub width: u32,
    pub height: u32,
    pub elapsed: Duration,
}

impl StreamMetadata {
    /// `<width>x<height>`
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Elapsed seconds with millisecond precision
    pub fn elapsed_secs(&self) -> String {
        format!("{:.3}", self.elapsed.as_secs_f64())
    }

    /// Suffix appended to an enriched catalog line: `,<w>x<h>,<secs>`
    pub fn line_suffix(&self) -> String {
        format!(",{},{}", self.dimensions(), self.elapsed_secs())
    }
}

/// Reachability conclusion for one source in one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub source: Source,
    pub alive: bool,

    /// Latency of the last successful attempt
    pub latency: Option<Duration>,

    /// Successful attempts out of `attempts`
    pub successes: u32,
    pub attempts: u32,

    /// Last attempt error, kept for logging only
    pub last_error: Option<String>,
}

impl Verdict {
    /// Verdict for a source whose evaluation failed outright
    pub fn failed(source: Source, error: impl Into<String>) -> Self {
        Self {
            source,
            alive: false,
            latency: None,
            successes: 0,
            attempts: 0,
            last_error: Some(error.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.alive { "ALIVE" } else { "DEAD" };
        write!(
            f,
            "[{status}] {} ({}/{})",
            self.source.name, self.successes, self.attempts
        )
    }
}

/// Verdicts of one scheduler run keyed by source name.
///
/// Iteration follows the category's source order (first occurrence of each
/// name). Inserting a name twice keeps the last verdict.
#[derive(Debug, Clone, Default)]
pub struct VerdictSet {
    order: Vec<String>,
    ordered: HashSet<String>,
    entries: HashMap<String, Verdict>,
}

impl VerdictSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set whose iteration order follows the given sources
    pub fn for_sources<'a>(sources: impl IntoIterator<Item = &'a Source>) -> Self {
        let mut set = Self::default();
        for source in sources {
            set.track(&source.name);
        }
        set
    }

    fn track(&mut self, name: &str) {
        if !self.ordered.contains(name) {
            self.ordered.insert(name.to_string());
            self.order.push(name.to_string());
        }
    }

    /// Insert a verdict, returning the one it replaced
    pub fn insert(&mut self, verdict: Verdict) -> Option<Verdict> {
        let name = verdict.source.name.clone();
        self.track(&name);
        self.entries.insert(name, verdict)
    }

    pub fn get(&self, name: &str) -> Option<&Verdict> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Verdict> {
        self.order.iter().filter_map(|n| self.entries.get(n))
    }

    pub fn alive(&self) -> impl Iterator<Item = &Verdict> {
        self.iter().filter(|v| v.alive)
    }

    pub fn dead(&self) -> impl Iterator<Item = &Verdict> {
        self.iter().filter(|v| !v.alive)
    }
}

/// Summary of one check run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: u64,
    pub alive: u64,
    pub dead: u64,

    /// Evaluations that failed outright (recorded as dead as well)
    pub failed: u64,
}

impl RunStats {
    /// Percentage of evaluated sources found alive
    pub fn alive_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.alive as f64 / self.total as f64) * 100.0
    }
}
