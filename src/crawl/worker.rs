//! Download worker pool
//!
//! Executes download tasks with bounded concurrency. Each task is independent
//! and gets exactly one attempt per run: transport errors are counted as
//! failures and left for a later invocation to retry. Aggregate counts are
//! accumulated commutatively, so they do not depend on completion order.

use crate::journal::CompletionLog;
use crate::listing::ListingClassifier;
use crate::url::file_name;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::explorer::DownloadTask;

/// Result of one download task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was fetched, written, and recorded in the completion log
    Completed,

    /// The task failed (transport error or empty body) and may be retried
    /// on a later invocation
    Failed,

    /// A finished copy already existed, locally or per the completion log
    Skipped,

    /// The URL did not name a file; nothing was counted
    NotAFile,
}

/// Aggregate success/failure/skip counters for a set of tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub success: u64,
    pub failure: u64,
    pub skipped: u64,
}

impl TaskCounts {
    /// Folds one outcome into the counters; neutral outcomes are ignored
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Completed => self.success += 1,
            Outcome::Failed => self.failure += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::NotAFile => {}
        }
    }

    pub fn merge(&mut self, other: TaskCounts) {
        self.success += other.success;
        self.failure += other.failure;
        self.skipped += other.skipped;
    }

    pub fn total(&self) -> u64 {
        self.success + self.failure + self.skipped
    }
}

/// Executes `tasks` with `workers` parallel downloads
///
/// `workers == 1` runs the tasks sequentially in submission order. Higher
/// degrees dispatch every task onto a pool bounded by a semaphore, with no
/// defined completion order.
pub async fn download_all(
    client: &Client,
    classifier: Arc<dyn ListingClassifier>,
    log: Arc<CompletionLog>,
    tasks: Vec<DownloadTask>,
    workers: usize,
    resume: bool,
) -> TaskCounts {
    let mut counts = TaskCounts::default();
    if tasks.is_empty() {
        return counts;
    }

    tracing::info!(
        "Downloading {} files with {} worker(s)",
        tasks.len(),
        workers
    );

    let bar = ProgressBar::new(tasks.len() as u64).with_style(
        ProgressStyle::with_template("{spinner} Downloading ({pos}/{len}) {wide_bar} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    if workers <= 1 {
        for task in tasks {
            let outcome =
                download_one(client.clone(), classifier.clone(), log.clone(), resume, task).await;
            counts.record(outcome);
            bar.inc(1);
        }
    } else {
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut pool = JoinSet::new();

        for task in tasks {
            let semaphore = semaphore.clone();
            let client = client.clone();
            let classifier = classifier.clone();
            let log = log.clone();
            let bar = bar.clone();

            pool.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Outcome::Failed,
                };
                let outcome = download_one(client, classifier, log, resume, task).await;
                bar.inc(1);
                outcome
            });
        }

        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(outcome) => counts.record(outcome),
                Err(e) => {
                    tracing::error!("Download task panicked: {}", e);
                    counts.failure += 1;
                }
            }
        }
    }

    bar.finish_and_clear();
    counts
}

/// Runs a single download task to completion
///
/// The sequence mirrors the resume semantics of the whole system:
///
/// 1. In resume mode, a completion-log hit skips the task with no network
///    call.
/// 2. An existing non-empty destination file skips the task and is recorded
///    in the log; an existing empty file is removed and re-fetched.
/// 3. The URL is fetched once. Transport errors and non-2xx statuses fail
///    the task.
/// 4. A body that is itself a directory listing is discarded as not-a-file.
/// 5. The body is written out and must be non-empty on disk before the URL
///    is recorded in the completion log.
async fn download_one(
    client: Client,
    classifier: Arc<dyn ListingClassifier>,
    log: Arc<CompletionLog>,
    resume: bool,
    task: DownloadTask,
) -> Outcome {
    let Some(name) = file_name(&task.url) else {
        return Outcome::NotAFile;
    };
    let path = task.dest_dir.join(&name);

    if resume && log.contains(&task.url) {
        tracing::debug!("Already downloaded per the log: {}", task.url);
        return Outcome::Skipped;
    }

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.len() > 0 => {
            tracing::debug!("File {} already exists", path.display());
            if let Err(e) = log.mark_complete(&task.url) {
                tracing::warn!("Failed to record {} in completion log: {}", task.url, e);
            }
            return Outcome::Skipped;
        }
        Ok(_) => {
            tracing::debug!("File {} exists but is empty, refetching", path.display());
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Cannot remove empty file {}: {}", path.display(), e);
            }
        }
        Err(_) => {}
    }

    let response = match client.get(&task.url).send().await {
        Ok(response) => match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", task.url, e);
                return Outcome::Failed;
            }
        },
        Err(e) => {
            tracing::warn!("Failed to download {}: {}", task.url, e);
            return Outcome::Failed;
        }
    };

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to read body of {}: {}", task.url, e);
            return Outcome::Failed;
        }
    };

    // A file enumeration that missed a trailing-slash case can hand us a
    // listing page here; discard it rather than mirroring index HTML.
    if let Ok(text) = std::str::from_utf8(&body) {
        if classifier.is_directory_listing(&task.url, text) {
            tracing::debug!("{} served a listing, not a file", task.url);
            return Outcome::NotAFile;
        }
    }

    if let Err(e) = tokio::fs::create_dir_all(&task.dest_dir).await {
        tracing::warn!("Cannot create {}: {}", task.dest_dir.display(), e);
        return Outcome::Failed;
    }

    if let Err(e) = tokio::fs::write(&path, &body).await {
        tracing::warn!("Cannot write {}: {}", path.display(), e);
        return Outcome::Failed;
    }

    let written = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.len())
        .unwrap_or(0);
    if written == 0 {
        tracing::warn!("Downloaded file {} is empty", path.display());
        return Outcome::Failed;
    }

    if let Err(e) = log.mark_complete(&task.url) {
        tracing::warn!("Failed to record {} in completion log: {}", task.url, e);
    }
    tracing::info!("Downloaded {}", path.display());
    Outcome::Completed
}
