//! Mirror orchestration
//!
//! Drives each manifest root through exploration and download, accumulating
//! run-level counters. Failures stay local to a task or a branch of the
//! traversal; the run itself never aborts because one root misbehaved.

use crate::config::Config;
use crate::crawl::explorer::Explorer;
use crate::crawl::fetch::build_http_client;
use crate::crawl::worker::download_all;
use crate::journal::CompletionLog;
use crate::listing::{HtmlListing, ListingClassifier};
use crate::manifest::Manifest;
use crate::output::RunSummary;
use crate::url::ensure_directory_url;
use crate::MirrorError;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

/// Run-shaping options resolved from the command line
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Root of the local mirror tree
    pub output_root: PathBuf,

    /// Trust prior progress recorded in the completion log and on disk
    pub resume: bool,

    /// Parallel download workers; falls back to the configured default
    pub workers: Option<usize>,

    /// Only process manifest rows whose `format` matches
    pub format_filter: Option<String>,
}

/// Orchestrates one mirror run over a manifest
pub struct Mirror {
    client: Client,
    classifier: Arc<dyn ListingClassifier>,
    log: Arc<CompletionLog>,
    output_root: PathBuf,
    resume: bool,
    workers: usize,
    format_filter: Option<String>,
}

impl Mirror {
    /// Creates a mirror run
    ///
    /// The output root is created if absent and its completion log is loaded
    /// (or, in resume mode, reconstructed from the existing file tree).
    pub fn new(config: &Config, options: MirrorOptions) -> Result<Self, MirrorError> {
        std::fs::create_dir_all(&options.output_root)?;

        let log = Arc::new(CompletionLog::load(
            &options.output_root,
            options.resume,
            config.download.log_flush_interval,
        ));

        if options.resume {
            tracing::info!(
                "Resume mode: {} files already downloaded per the log",
                log.len()
            );
        }

        let client = build_http_client(&config.http)?;
        let workers = options.workers.unwrap_or(config.download.workers).max(1);

        Ok(Self {
            client,
            classifier: Arc::new(HtmlListing),
            log,
            output_root: options.output_root,
            resume: options.resume,
            workers,
            format_filter: options.format_filter,
        })
    }

    /// Processes every eligible manifest row and returns the run summary
    pub async fn run(&self, manifest: &Manifest) -> RunSummary {
        let mut summary = RunSummary::new();

        let format_filter = match (&self.format_filter, manifest.has_format_column) {
            (Some(filter), false) => {
                tracing::warn!(
                    "Manifest has no 'format' column; ignoring format filter '{}'",
                    filter
                );
                None
            }
            (filter, _) => filter.clone(),
        };

        // First pass over the manifest: decide which roots need processing.
        let mut roots = Vec::new();
        for (index, row) in manifest.rows.iter().enumerate() {
            let source = row.source.trim();
            if source.is_empty() {
                tracing::warn!("Missing URL in manifest row {}", index + 1);
                summary.counts.failure += 1;
                continue;
            }

            let root_url = ensure_directory_url(source);

            if let Some(filter) = &format_filter {
                if row.format.as_deref().map(str::trim) != Some(filter.as_str()) {
                    summary.filtered += 1;
                    continue;
                }
            }

            if self.resume && self.log.contains(&root_url) {
                tracing::info!("Root already processed per the log: {}", root_url);
                summary.roots_skipped += 1;
                continue;
            }

            tracing::info!(
                "Queued root {} (millesime: {}, format: {})",
                root_url,
                row.millesime.as_deref().unwrap_or("unknown"),
                row.format.as_deref().unwrap_or("-")
            );
            roots.push(root_url);
        }

        for (index, root_url) in roots.iter().enumerate() {
            tracing::info!("Processing root {}/{}: {}", index + 1, roots.len(), root_url);
            self.process_root(root_url, &mut summary).await;
        }

        if let Err(e) = self.log.flush() {
            tracing::warn!("Failed to flush completion log: {}", e);
        }

        summary
    }

    /// Explores one root and downloads everything it yielded
    ///
    /// In resume mode the root URL itself is marked complete once its
    /// subtree has been attempted, even when individual tasks failed; the
    /// failed files stay out of the log and are retried by a later run
    /// against the same root.
    async fn process_root(&self, root_url: &str, summary: &mut RunSummary) {
        let explorer = Explorer::new(
            &self.client,
            self.classifier.as_ref(),
            &self.log,
            &self.output_root,
            self.resume,
        );
        let tasks = explorer.explore(root_url).await;

        if tasks.is_empty() {
            tracing::info!("No files to download for {}", root_url);
        } else {
            let counts = download_all(
                &self.client,
                self.classifier.clone(),
                self.log.clone(),
                tasks,
                self.workers,
                self.resume,
            )
            .await;
            summary.counts.merge(counts);
        }

        if self.resume {
            if let Err(e) = self.log.mark_complete(root_url) {
                tracing::warn!("Failed to record root {} in completion log: {}", root_url, e);
            }
        }

        if let Err(e) = self.log.flush() {
            tracing::warn!("Failed to flush completion log: {}", e);
        }
    }
}
