//! Bounded-time asset acquisition.
//!
//! Walks the page's references strictly in order and fetches them one at a
//! time under a single wall-clock budget shared across every category. The
//! deadline is computed once at batch start and checked before each item;
//! an in-flight request is never interrupted, so the total run time can
//! exceed the budget by up to one per-request timeout.

use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

use crate::category::Category;
use crate::fetch::{fetch_asset, save_asset, FetchError};
use crate::http::HttpGet;
use crate::layout::RunDirs;
use crate::page::RawReference;
use crate::sanitize::sanitize_filename;

/// Fallback local name when a reference's basename is empty (e.g. a URL
/// ending in `/`).
const DEFAULT_LOCAL_NAME: &str = "asset.bin";

/// A page reference after resolution against the page URL.
#[derive(Debug, Clone)]
pub struct AssetReference {
    pub category: Category,
    pub source_attribute: &'static str,
    pub raw_url: String,
    /// Absolute URL to fetch; `None` if the reference could not be resolved
    /// to one (it will be skipped without a network call).
    pub resolved_url: Option<Url>,
    /// Sanitized basename used for the local file and the rewritten path.
    pub local_name: String,
}

impl AssetReference {
    /// Relative path the rewriter writes into the page: `<subdir>/<name>`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.category.subdir(), self.local_name)
    }
}

/// Result of one acquisition attempt. Attempts are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Saved,
    SkippedInvalidUrl,
    FetchFailed,
    WriteFailed,
}

/// One attempted reference and what happened to it.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub reference: AssetReference,
    pub status: OutcomeStatus,
    /// Where the bytes landed; present only when `status` is `Saved`.
    pub local_path: Option<PathBuf>,
}

/// The finished batch: every outcome in attempt order, plus whether the
/// budget ran out before all references were reached.
#[derive(Debug)]
pub struct AcquisitionRun {
    pub budget: Duration,
    pub outcomes: Vec<DownloadOutcome>,
    pub truncated: bool,
}

/// Fetches `references` sequentially until done or out of budget.
///
/// The budget is shared across the entire batch: if earlier categories
/// consume it, later ones are skipped wholesale. References the loop never
/// reaches get no outcome at all, which is what lets the rewriter prove a
/// path was attempted before emitting it.
pub fn run(
    references: &[RawReference],
    base: &Url,
    budget: Duration,
    http: &dyn HttpGet,
    dirs: &RunDirs,
) -> AcquisitionRun {
    let started = Instant::now();
    let deadline = started + budget;
    let mut outcomes = Vec::new();
    let mut truncated = false;

    for raw in references {
        if Instant::now() >= deadline {
            tracing::warn!(
                budget_secs = budget.as_secs(),
                attempted = outcomes.len(),
                remaining = references.len() - outcomes.len(),
                "time budget exceeded, stopping further downloads"
            );
            truncated = true;
            break;
        }

        let reference = resolve_reference(raw, base);
        let outcome = attempt(reference, http, dirs);
        match outcome.status {
            OutcomeStatus::Saved => {
                tracing::debug!(file = %outcome.reference.local_name, "saved asset");
            }
            OutcomeStatus::SkippedInvalidUrl => {
                tracing::warn!(url = %outcome.reference.raw_url, "skipping invalid URL");
            }
            OutcomeStatus::FetchFailed => {
                tracing::warn!(file = %outcome.reference.local_name, "failed to download file");
            }
            OutcomeStatus::WriteFailed => {
                tracing::warn!(file = %outcome.reference.local_name, "failed to save file");
            }
        }
        outcomes.push(outcome);
    }

    AcquisitionRun {
        budget,
        outcomes,
        truncated,
    }
}

/// Resolves a raw attribute value into an absolute URL where possible.
///
/// Absolute references must have a host; plausible relative references
/// (non-empty, no whitespace) are joined against the page URL. Anything
/// else stays unresolved and is later skipped without a network call.
fn resolve_reference(raw: &RawReference, base: &Url) -> AssetReference {
    let resolved_url = match Url::parse(&raw.url) {
        Ok(url) if url.has_host() => Some(url),
        Ok(_) => None,
        Err(url::ParseError::RelativeUrlWithoutBase)
            if !raw.url.is_empty() && !raw.url.chars().any(char::is_whitespace) =>
        {
            base.join(&raw.url).ok().filter(Url::has_host)
        }
        Err(_) => None,
    };

    let local_name = match &resolved_url {
        Some(url) => basename_of(url.path()),
        None => basename_of(&raw.url),
    };

    AssetReference {
        category: raw.category,
        source_attribute: raw.source_attribute,
        raw_url: raw.url.clone(),
        resolved_url,
        local_name,
    }
}

/// Sanitized last path segment, or a fallback when there is none.
fn basename_of(path: &str) -> String {
    let segment = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let name = sanitize_filename(segment);
    if name.is_empty() {
        DEFAULT_LOCAL_NAME.to_string()
    } else {
        name
    }
}

fn attempt(reference: AssetReference, http: &dyn HttpGet, dirs: &RunDirs) -> DownloadOutcome {
    let Some(resolved) = reference.resolved_url.clone() else {
        return DownloadOutcome {
            reference,
            status: OutcomeStatus::SkippedInvalidUrl,
            local_path: None,
        };
    };

    let bytes = match fetch_asset(http, resolved.as_str()) {
        Ok(bytes) => bytes,
        Err(err) => {
            let status = match err {
                FetchError::InvalidUrl(_) => OutcomeStatus::SkippedInvalidUrl,
                FetchError::Write(_) => OutcomeStatus::WriteFailed,
                FetchError::Network(_) | FetchError::Status(_) => OutcomeStatus::FetchFailed,
            };
            tracing::debug!(url = %resolved, error = %err, "asset fetch error");
            return DownloadOutcome {
                reference,
                status,
                local_path: None,
            };
        }
    };

    let dir = dirs.category_dir(reference.category);
    match save_asset(&dir, &reference.local_name, &bytes) {
        Ok(path) => DownloadOutcome {
            reference,
            status: OutcomeStatus::Saved,
            local_path: Some(path),
        },
        Err(err) => {
            tracing::debug!(error = %err, "asset write error");
            DownloadOutcome {
                reference,
                status: OutcomeStatus::WriteFailed,
                local_path: None,
            }
        }
    }
}
