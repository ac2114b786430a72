//! Run directory provisioning.
//!
//! Each run gets a unique root named `<timestamp>_<sanitized title>` with a
//! fixed set of per-category subdirectories underneath.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::category::Category;
use crate::sanitize::sanitize_filename;

/// Final rewritten page, written last.
pub const INDEX_FILE: &str = "index.html";

/// Raw fetched page bytes, persisted unmodified as a backup artifact.
pub const RAW_PAGE_FILE: &str = "page.orig.html";

/// Paths for one provisioned run: the root directory plus the fixed
/// per-category subdirectories.
#[derive(Debug, Clone)]
pub struct RunDirs {
    root: PathBuf,
}

impl RunDirs {
    /// Root directory of the run.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Subdirectory for a category's fetched assets.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.subdir())
    }

    /// Path of the final rewritten page.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Path of the unmodified raw page copy.
    pub fn raw_page_path(&self) -> PathBuf {
        self.root.join(RAW_PAGE_FILE)
    }
}

/// Creates the run root under `parent` and all category subdirectories.
///
/// The root name is `<%Y%m%d_%H%M%S>_<sanitize(title truncated to 20 chars)>`;
/// second resolution keeps the name lexicographically sortable, and collision
/// at that resolution is accepted as negligible. Creating an already-existing
/// directory is not an error.
pub fn provision(parent: &Path, title: &str) -> Result<RunDirs> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let short_title: String = title.chars().take(20).collect();
    let root = parent.join(format!("{}_{}", timestamp, sanitize_filename(&short_title)));

    fs::create_dir_all(&root)
        .with_context(|| format!("failed to create run directory: {}", root.display()))?;

    let dirs = RunDirs { root };
    for category in Category::ALL {
        let sub = dirs.category_dir(category);
        fs::create_dir_all(&sub)
            .with_context(|| format!("failed to create subdirectory: {}", sub.display()))?;
    }
    Ok(dirs)
}
