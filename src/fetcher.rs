//! Concurrent HTTP fetcher for remote filter lists.
//!
//! Each source is downloaded with a single GET (no retries; a failed
//! source simply counts as failed for this run), streamed into a private
//! temporary file, validated and persisted atomically. Failures are
//! isolated per source: nothing a source does can abort its siblings, and
//! the batch always waits for every source to resolve.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::checksum;
use crate::config::Source;
use crate::error::PipelineError;
use crate::metadata::SourceOutcome;
use crate::persist;

/// Fixed per-request timeout.
const TIMEOUT_SECS: u64 = 60;

/// Browser-like User-Agent; several list servers reject unknown clients.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:131.0) Gecko/20100101 Firefox/131.0";

/// Default maximum number of in-flight downloads.
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// HTTP client for downloading filter lists into an output directory.
pub struct Fetcher {
    client: Client,
    output_dir: PathBuf,
}

impl Fetcher {
    /// Create a fetcher writing into `output_dir`.
    pub fn new(output_dir: &Path) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Fetch all `sources` concurrently, at most `max_concurrent` in
    /// flight. Returns one outcome per source; the result set is merged
    /// only after every source has resolved.
    pub async fn fetch_all(&self, sources: &[Source], max_concurrent: usize) -> Vec<SourceOutcome> {
        stream::iter(sources.iter().map(|source| self.fetch_source(source)))
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await
    }

    /// Fetch a single source. Never fails the caller; errors are folded
    /// into `success: false`.
    pub async fn fetch_source(&self, source: &Source) -> SourceOutcome {
        let filename = source.resolved_filename();
        match self.download_and_persist(source, &filename).await {
            Ok(checksum_validated) => {
                info!("Fetched {} -> {}", source.url, filename);
                SourceOutcome {
                    url: source.url.clone(),
                    filename,
                    success: true,
                    checksum_validated,
                }
            }
            Err(e) => {
                error!("Failed to fetch {}: {e:#}", source.url);
                SourceOutcome {
                    url: source.url.clone(),
                    filename,
                    success: false,
                    checksum_validated: false,
                }
            }
        }
    }

    /// Stream the body into a temp file owned by this call, then validate
    /// and persist it. The temp file is removed on every exit path (its
    /// guard drops at the end of this function, success or not).
    async fn download_and_persist(&self, source: &Source, filename: &str) -> Result<bool> {
        let fetch_err = |reason: String| PipelineError::Fetch {
            url: source.url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&source.url)
            .header(reqwest::header::ACCEPT, "text/plain,*/*")
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| fetch_err(e.to_string()))?;

        let mut tmp = NamedTempFile::new().context("Failed to create temp file")?;
        let mut bytes = 0usize;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| fetch_err(e.to_string()))?;
            tmp.write_all(&chunk)
                .with_context(|| format!("Failed to spool {} to temp file", source.url))?;
            bytes += chunk.len();
        }
        tmp.flush().context("Failed to flush temp file")?;
        debug!("Downloaded {bytes} bytes from {}", source.url);

        let content = std::fs::read_to_string(tmp.path())
            .with_context(|| format!("Downloaded content of {} is not UTF-8", source.url))?;

        let checksum_validated = if source.skip_checksum {
            debug!("Checksum validation skipped for {filename}");
            false
        } else {
            checksum::validate(&content, filename)?
        };

        persist::check_min_size(&content, filename)?;
        persist::write_atomic(&self.output_dir.join(filename), &content)?;

        Ok(checksum_validated)
    }
}
