//! Where schedule markup comes from.
//!
//! Parsing never touches the network directly: callers hand a
//! `ScheduleSource` to `load_schedule`, which lets tests and `--file`
//! runs substitute pre-fetched markup.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{SchedError, SchedResult};

const USER_AGENT: &str = concat!("schedcal/", env!("CARGO_PKG_VERSION"));

/// Provides the raw schedule markup.
#[allow(async_fn_in_trait)]
pub trait ScheduleSource {
    async fn fetch(&self) -> SchedResult<String>;
}

/// HTTP transport options for `HttpSource`.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Skip TLS certificate validation. Off unless explicitly requested.
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            accept_invalid_certs: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Downloads the schedule page with a single GET request.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, options: &FetchOptions) -> SchedResult<Self> {
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate validation is disabled for the schedule download");
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| SchedError::Fetch(format!("could not build HTTP client: {e}")))?;

        Ok(HttpSource {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ScheduleSource for HttpSource {
    async fn fetch(&self) -> SchedResult<String> {
        tracing::debug!(url = %self.url, "fetching schedule");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SchedError::Fetch(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SchedError::Fetch(format!("{} returned {status}", self.url)));
        }

        response
            .text()
            .await
            .map_err(|e| SchedError::Fetch(format!("{}: {e}", self.url)))
    }
}

/// Reads markup saved to disk beforehand.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl ScheduleSource for FileSource {
    async fn fetch(&self) -> SchedResult<String> {
        tracing::debug!(path = %self.path.display(), "reading schedule from file");
        Ok(std::fs::read_to_string(&self.path)?)
    }
}
