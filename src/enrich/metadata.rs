//! Stream metadata probing
//!
//! [`FfprobeMetadata`] checks that the address answers a HEAD request, then
//! asks `ffprobe` for the first video stream's dimensions. The elapsed time
//! covers both steps.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::checker::headers;
use crate::models::StreamMetadata;
use crate::utils::error::ProbeError;
use crate::utils::has_address;

/// Reads stream dimensions for one address
#[async_trait]
pub trait MetadataProbe: Send + Sync {
    /// Probe name for logging
    fn name(&self) -> &str;

    /// Read dimensions and measure how long it took
    async fn probe(&self, address: &str, timeout: Duration) -> Result<StreamMetadata, ProbeError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -of json -show_entries stream=width,height` output
pub fn parse_ffprobe_dimensions(json: &[u8]) -> Result<(u32, u32), ProbeError> {
    let output: FfprobeOutput = serde_json::from_slice(json)
        .map_err(|e| ProbeError::Metadata(format!("invalid ffprobe output: {e}")))?;

    output
        .streams
        .iter()
        .find_map(|s| Some((s.width?, s.height?)))
        .ok_or_else(|| ProbeError::Metadata("no video stream".to_string()))
}

/// HEAD pre-check followed by `ffprobe`
pub struct FfprobeMetadata {
    client: Client,
    ffprobe: String,
}

impl FfprobeMetadata {
    /// # Errors
    ///
    /// Returns `ProbeError::Http` if the HTTP client cannot be created
    pub fn new(ffprobe: impl Into<String>) -> Result<Self, ProbeError> {
        let client = Client::builder().gzip(true).build()?;
        Ok(Self {
            client,
            ffprobe: ffprobe.into(),
        })
    }

    async fn head_check(&self, address: &str, timeout: Duration) -> Result<(), ProbeError> {
        let response = self
            .client
            .head(address)
            .headers(headers::build_probe_headers(headers::random_user_agent()))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { ProbeError::Timeout } else { ProbeError::Http(e) })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn read_dimensions(&self, address: &str, timeout: Duration) -> Result<(u32, u32), ProbeError> {
        let child = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "json",
                address,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProbeError::Metadata(format!("failed to start {}: {e}", self.ffprobe)))?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout)?
            .map_err(|e| ProbeError::Metadata(format!("ffprobe failed: {e}")))?;

        if !output.status.success() {
            return Err(ProbeError::Metadata(format!("ffprobe exited with {}", output.status)));
        }

        parse_ffprobe_dimensions(&output.stdout)
    }
}

#[async_trait]
impl MetadataProbe for FfprobeMetadata {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, address: &str, timeout: Duration) -> Result<StreamMetadata, ProbeError> {
        if !has_address(address) {
            return Err(ProbeError::InvalidAddress(address.to_string()));
        }

        let started = Instant::now();
        tracing::debug!(address = %address, "Checking stream dimensions");

        self.head_check(address, timeout).await?;
        let (width, height) = self.read_dimensions(address, timeout).await?;

        Ok(StreamMetadata {
            width,
            height,
            elapsed: started.elapsed(),
        })
    }
}
