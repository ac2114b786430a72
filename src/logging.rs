//! Logging init: structured diagnostics to stderr.
//!
//! Every skip, failure, and the truncation notice surfaces here; the tool's
//! only caller is an interactive user, so stderr is the log sink.

use tracing_subscriber::EnvFilter;

/// Initialize tracing to stderr. `RUST_LOG` overrides the default filter.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,pagesnap=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}
