//! Command-line surface: one required URL, one optional budget.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::time::Duration;

use crate::http::CurlHttp;
use crate::pipeline::{self, MirrorOptions};

/// Mirror a single web page and its referenced assets into a timestamped
/// local directory.
#[derive(Debug, Parser)]
#[command(name = "pagesnap")]
#[command(about = "Best-effort offline mirror of one web page", long_about = None)]
pub struct Cli {
    /// Website address to mirror.
    pub url: String,

    /// Wall-clock budget for asset downloads, in whole seconds. Shared
    /// across all assets on the page.
    #[arg(default_value_t = 4)]
    pub budget_secs: u64,
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let options = MirrorOptions {
            url: cli.url,
            budget: Duration::from_secs(cli.budget_secs),
        };

        let report = pipeline::mirror(&options, &CurlHttp, Path::new("."))?;

        if report.truncated {
            println!(
                "Time budget exceeded ({}s); {} of {} references were not attempted.",
                cli.budget_secs,
                report.total_references - report.attempted,
                report.total_references
            );
        }
        println!(
            "Website mirroring completed: {} saved, {} failed, {} skipped -> {}",
            report.saved,
            report.failed,
            report.skipped,
            report.root.display()
        );
        Ok(())
    }
}
