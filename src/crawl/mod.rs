//! Crawl module: exploration, download, and orchestration
//!
//! This module contains the core mirroring logic:
//! - HTTP client construction
//! - Remote directory exploration (work-stack depth-first traversal)
//! - The bounded-concurrency download worker pool
//! - Per-manifest orchestration and counter aggregation

mod explorer;
mod fetch;
mod orchestrator;
mod worker;

pub use explorer::{DownloadTask, Explorer};
pub use fetch::build_http_client;
pub use orchestrator::{Mirror, MirrorOptions};
pub use worker::{download_all, Outcome, TaskCounts};

use crate::config::Config;
use crate::manifest::Manifest;
use crate::output::RunSummary;
use crate::MirrorError;

/// Runs a complete mirror operation over a manifest
///
/// This is the main library entry point: it builds the HTTP client, loads
/// (or reconstructs) the completion log for the output root, explores every
/// eligible manifest root, downloads the discovered files, and returns the
/// aggregated summary.
pub async fn mirror(
    config: &Config,
    options: MirrorOptions,
    manifest: &Manifest,
) -> Result<RunSummary, MirrorError> {
    let run = Mirror::new(config, options)?;
    Ok(run.run(manifest).await)
}
