//! Single-attempt asset fetching and persistence.
//!
//! Validation happens before any network call; fetching is one GET with a
//! fixed per-request timeout, never retried, so the scheduler's time budget
//! stays predictable. Writing the bytes to disk is a separable second step
//! with its own failure mode.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::http::{HttpError, HttpGet};
use crate::sanitize::sanitize_filename;

/// Fixed timeout for each individual GET. Deliberately independent of the
/// batch budget: the budget bounds when new fetches may start, this bounds
/// how long any single one may run.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(4);

/// Why one asset could not be acquired.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Reference is not an absolute URL with a scheme and host. Detected
    /// before any network call.
    #[error("invalid url: {0:?}")]
    InvalidUrl(String),
    /// Transport failure or timeout.
    #[error("fetch failed: {0}")]
    Network(#[from] HttpError),
    /// GET completed but the server answered with a non-2xx status.
    #[error("fetch failed: HTTP {0}")]
    Status(u32),
    /// Bytes arrived but could not be persisted locally.
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// True if `url` parses as absolute with both a scheme and a host.
pub fn is_valid_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.has_host(),
        Err(_) => false,
    }
}

/// Fetches one resource with a single GET. No retries.
pub fn fetch_asset(http: &dyn HttpGet, url: &str) -> Result<Vec<u8>, FetchError> {
    if !is_valid_url(url) {
        return Err(FetchError::InvalidUrl(url.to_string()));
    }

    let response = http.get(url, REQUEST_TIMEOUT)?;
    if !(200..300).contains(&response.status) {
        return Err(FetchError::Status(response.status));
    }
    Ok(response.body)
}

/// Writes `bytes` to `<dir>/<sanitize(name)>`, creating parent directories
/// as needed. Returns the written path.
pub fn save_asset(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, FetchError> {
    let path = dir.join(sanitize_filename(name));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, bytes)?;
    Ok(path)
}
