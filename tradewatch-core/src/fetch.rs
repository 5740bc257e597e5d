//! Archive fetcher.
//!
//! The `ArchiveSource` trait abstracts over where bytes come from so the
//! pipeline can be driven by a fake in tests. `HttpSource` is the blocking
//! reqwest implementation used in production.

use crate::config::FetchConfig;
use crate::error::{Result, WatchError};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Something that can return the full body behind a URL.
pub trait ArchiveSource {
    fn name(&self) -> &str;

    /// Perform one blocking retrieval and return the whole response body.
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// What `fetch_archive` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination was already on disk; no network call was made.
    AlreadyPresent,
    /// Body was downloaded and written.
    Downloaded { bytes: usize },
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// No resume, checksum or retry. Parent directories are created as needed.
pub fn fetch_archive(source: &dyn ArchiveSource, url: &str, dest: &Path) -> Result<FetchOutcome> {
    if dest.exists() {
        debug!(path = %dest.display(), "archive already present, skipping download");
        return Ok(FetchOutcome::AlreadyPresent);
    }

    info!(url, source = source.name(), "downloading archive");
    let body = source.get(url)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WatchError::io(parent, e))?;
    }
    std::fs::write(dest, &body).map_err(|e| WatchError::io(dest, e))?;

    info!(path = %dest.display(), bytes = body.len(), "archive written");
    Ok(FetchOutcome::Downloaded { bytes: body.len() })
}

/// Blocking HTTP source with connect and overall timeouts.
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(concat!("tradewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WatchError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl ArchiveSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| WatchError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WatchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp
            .bytes()
            .map_err(|e| WatchError::NetworkUnreachable(e.to_string()))?;
        Ok(body.to_vec())
    }
}
