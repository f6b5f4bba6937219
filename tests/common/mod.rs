//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use livecheck::checker::{Probe, ProbeOutcome};
use livecheck::enrich::MetadataProbe;
use livecheck::models::StreamMetadata;
use livecheck::utils::error::ProbeError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

fn success() -> Result<ProbeOutcome, ProbeError> {
    Ok(ProbeOutcome {
        latency: Duration::from_millis(5),
    })
}

/// Every attempt succeeds
pub struct AlwaysUp;

#[async_trait]
impl Probe for AlwaysUp {
    fn name(&self) -> &str {
        "always-up"
    }

    async fn attempt(&self, _address: &str, _timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        success()
    }
}

/// Every attempt fails
pub struct AlwaysDown;

#[async_trait]
impl Probe for AlwaysDown {
    fn name(&self) -> &str {
        "always-down"
    }

    async fn attempt(&self, _address: &str, _timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        Err(ProbeError::Status(503))
    }
}

/// Replays the same attempt script for every address
pub struct ScriptedProbe {
    script: Vec<bool>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedProbe {
    pub fn new(script: &[bool]) -> Self {
        Self {
            script: script.to_vec(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls_for(&self, address: &str) -> usize {
        self.calls.lock().unwrap().get(address).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn attempt(&self, address: &str, _timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let counter = calls.entry(address.to_string()).or_insert(0);
            let call = *counter;
            *counter += 1;
            call
        };
        if self.script.get(call).copied().unwrap_or(false) {
            success()
        } else {
            Err(ProbeError::Timeout)
        }
    }
}

/// Succeeds after a short delay while tracking how many attempts run at once
#[derive(Default)]
pub struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    total: AtomicUsize,
}

impl ConcurrencyProbe {
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for ConcurrencyProbe {
    fn name(&self) -> &str {
        "concurrency"
    }

    async fn attempt(&self, _address: &str, _timeout: Duration) -> Result<ProbeOutcome, ProbeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        success()
    }
}

/// Reports 1280x720 in 1.5s, or fails for addresses containing "broken"
#[derive(Default)]
pub struct FixedMetadata {
    pub calls: AtomicUsize,
}

#[async_trait]
impl MetadataProbe for FixedMetadata {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn probe(&self, address: &str, _timeout: Duration) -> Result<StreamMetadata, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if address.contains("broken") {
            return Err(ProbeError::Metadata("no video stream".to_string()));
        }
        Ok(StreamMetadata {
            width: 1280,
            height: 720,
            elapsed: Duration::from_millis(1500),
        })
    }
}

/// Catalog used by the end-to-end scenarios
pub const NEWS_CATALOG: &str = "News,#genre#\nCNN,http://a\nBBC,http://b\n";

/// Flattened catalog of `entries` lines with a header every 50 lines
pub fn flat_catalog(entries: usize) -> Vec<String> {
    (0..entries)
        .map(|i| {
            if i % 50 == 0 {
                format!("Group{},#genre#", i / 50)
            } else {
                format!("Channel{i},http://example.com/{i}.m3u8")
            }
        })
        .collect()
}

/// Split ledger content into (header, entries) sections
pub fn sections(content: &str) -> Vec<(String, Vec<String>)> {
    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    for line in content.lines() {
        if line.contains("(检测时间: ") {
            sections.push((line.to_string(), Vec::new()));
        } else if let Some((_, entries)) = sections.last_mut() {
            entries.push(line.to_string());
        }
    }
    sections
}
