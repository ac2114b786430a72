//! End-to-end mirroring pipeline.
//!
//! Fetch the root page, extract the title, provision directories, persist
//! the raw copy, acquire assets under the budget, rewrite references, and
//! persist the final page. Root fetch, title extraction, and directory
//! creation are fatal; individual asset failures degrade to recorded
//! outcomes.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::category::Category;
use crate::fetch::fetch_asset;
use crate::http::HttpGet;
use crate::layout::{provision, RunDirs};
use crate::page::PageDom;
use crate::scheduler::{self, AcquisitionRun, OutcomeStatus};

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Page to mirror.
    pub url: String,
    /// Wall-clock budget shared across the whole asset batch.
    pub budget: Duration,
}

/// Summary handed back to the CLI after a completed run.
#[derive(Debug)]
pub struct MirrorReport {
    pub root: PathBuf,
    pub saved: usize,
    pub failed: usize,
    pub skipped: usize,
    pub attempted: usize,
    /// Total references found on the page; exceeds `attempted` when the
    /// batch was truncated.
    pub total_references: usize,
    pub truncated: bool,
}

/// The fetched root page: raw bytes plus the parsed tree derived from them.
/// The raw bytes are persisted unmodified; only the tree is ever mutated,
/// and only after the scheduler has finished reading references from it.
struct PageCapture {
    root_url: Url,
    title: String,
    raw_bytes: Vec<u8>,
    dom: PageDom,
}

/// Fetches and parses the root page. Any failure here is fatal: without a
/// reachable document and a title there is no destination to mirror into.
fn capture_page(options: &MirrorOptions, http: &dyn HttpGet) -> Result<PageCapture> {
    let root_url = Url::parse(&options.url)
        .with_context(|| format!("invalid website URL: {}", options.url))?;
    if !root_url.has_host() {
        return Err(anyhow!("invalid website URL (no host): {}", options.url));
    }

    let raw_bytes = fetch_asset(http, root_url.as_str())
        .with_context(|| format!("failed to access website: {}", root_url))?;
    tracing::debug!(bytes = raw_bytes.len(), "fetched root page");

    let dom = PageDom::parse(&raw_bytes);
    let title = dom
        .title()
        .ok_or_else(|| anyhow!("page has no usable <title>: {}", root_url))?;

    Ok(PageCapture {
        root_url,
        title,
        raw_bytes,
        dom,
    })
}

/// Runs the whole pipeline, writing the run directory under `dest_parent`.
pub fn mirror(
    options: &MirrorOptions,
    http: &dyn HttpGet,
    dest_parent: &Path,
) -> Result<MirrorReport> {
    let mut page = capture_page(options, http)?;

    let dirs = provision(dest_parent, &page.title)?;
    tracing::info!(dir = %dirs.root().display(), "provisioned run directory");

    // Keep the raw fetched bytes on disk unmodified; the rewritten page is
    // a separate artifact.
    fs::write(dirs.raw_page_path(), &page.raw_bytes)
        .with_context(|| format!("failed to persist raw page in {}", dirs.root().display()))?;

    let references = page.dom.references()?;
    tracing::debug!(count = references.len(), "enumerated asset references");

    let run = scheduler::run(&references, &page.root_url, options.budget, http, &dirs);

    let rewrites = rewrite_map(&run);
    page.dom.rewrite(&rewrites)?;
    let final_page = page.dom.serialize();
    fs::write(dirs.index_path(), final_page)
        .with_context(|| format!("failed to persist {}", dirs.index_path().display()))?;

    let report = summarize(dirs, run, references.len());
    tracing::info!(
        saved = report.saved,
        failed = report.failed,
        skipped = report.skipped,
        truncated = report.truncated,
        "website mirroring completed"
    );
    Ok(report)
}

/// Maps each attempted reference to its relative local path. Failed
/// attempts are mapped too, so the page points at the place the asset would
/// have been; references the scheduler never reached are absent and keep
/// their original URLs.
fn rewrite_map(run: &AcquisitionRun) -> HashMap<(Category, String), String> {
    run.outcomes
        .iter()
        .map(|outcome| {
            let r = &outcome.reference;
            ((r.category, r.raw_url.clone()), r.relative_path())
        })
        .collect()
}

fn summarize(dirs: RunDirs, run: AcquisitionRun, total_references: usize) -> MirrorReport {
    let count = |status: OutcomeStatus| {
        run.outcomes
            .iter()
            .filter(|o| o.status == status)
            .count()
    };
    MirrorReport {
        saved: count(OutcomeStatus::Saved),
        failed: count(OutcomeStatus::FetchFailed) + count(OutcomeStatus::WriteFailed),
        skipped: count(OutcomeStatus::SkippedInvalidUrl),
        attempted: run.outcomes.len(),
        total_references,
        truncated: run.truncated,
        root: dirs.root().to_path_buf(),
    }
}
