//! Remote directory exploration
//!
//! The explorer walks a remote subtree rooted at a directory URL and emits a
//! flat list of download tasks. It performs no downloads itself: listings are
//! fetched to discover children, files are only enqueued. Traversal uses an
//! explicit work stack rather than call recursion, so arbitrarily deep remote
//! hierarchies cannot exhaust the call stack.
//!
//! A fetch failure on a directory aborts that branch only; siblings and the
//! rest of the tree continue. URLs already visited within one exploration are
//! skipped silently, which terminates cyclic or self-referential listings.

use crate::journal::CompletionLog;
use crate::listing::ListingClassifier;
use crate::url::{destination_dir, file_name, parent_directory_url};
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One file-download unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Absolute URL of the remote file
    pub url: String,

    /// Local folder the file will be written into
    pub dest_dir: PathBuf,
}

/// Walks remote directory listings and produces download tasks
pub struct Explorer<'a> {
    client: &'a Client,
    classifier: &'a dyn ListingClassifier,
    log: &'a CompletionLog,
    output_root: &'a Path,
    resume: bool,
}

impl<'a> Explorer<'a> {
    pub fn new(
        client: &'a Client,
        classifier: &'a dyn ListingClassifier,
        log: &'a CompletionLog,
        output_root: &'a Path,
        resume: bool,
    ) -> Self {
        Self {
            client,
            classifier,
            log,
            output_root,
            resume,
        }
    }

    /// Explores the subtree rooted at `root_url` and returns its tasks
    ///
    /// Traversal is depth-first and deterministic given a stable listing
    /// order: a listing's file links are enqueued in listing order, then its
    /// subdirectories are explored nearest-sibling first.
    ///
    /// In resume mode, a file whose destination already holds a non-empty
    /// same-named file is recorded in the completion log and not enqueued,
    /// which avoids a redundant fetch just to rediscover finished work.
    pub async fn explore(&self, root_url: &str) -> Vec<DownloadTask> {
        let mut tasks = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pending = vec![root_url.to_string()];

        while let Some(dir_url) = pending.pop() {
            if !visited.insert(dir_url.clone()) {
                continue;
            }

            tracing::info!("Exploring {}", dir_url);

            let body = match self.fetch_text(&dir_url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("Failed to explore {}: {}", dir_url, e);
                    continue;
                }
            };

            if self.classifier.is_directory_listing(&dir_url, &body) {
                self.collect_listing(&dir_url, &body, &mut tasks, &mut pending)
                    .await;
            } else {
                // The URL turned out to be a terminal resource; download it
                // into its parent's mirror folder.
                let parent = parent_directory_url(&dir_url);
                match destination_dir(self.output_root, &parent) {
                    Ok(dest_dir) => tasks.push(DownloadTask {
                        url: dir_url,
                        dest_dir,
                    }),
                    Err(e) => tracing::warn!("Skipping {}: {}", dir_url, e),
                }
            }
        }

        tasks
    }

    /// Turns one listing page into tasks and further directories to visit
    async fn collect_listing(
        &self,
        dir_url: &str,
        body: &str,
        tasks: &mut Vec<DownloadTask>,
        pending: &mut Vec<String>,
    ) {
        let dest_dir = match destination_dir(self.output_root, dir_url) {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Skipping listing {}: {}", dir_url, e);
                return;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&dest_dir).await {
            tracing::warn!("Cannot create {}: {}", dest_dir.display(), e);
            return;
        }

        let mut subdirectories = Vec::new();
        for link in self.classifier.extract_links(dir_url, body) {
            if link.ends_with('/') {
                subdirectories.push(link);
                continue;
            }

            if self.resume && self.already_downloaded(&link, &dest_dir).await {
                tracing::debug!("Already on disk, logging and skipping {}", link);
                if let Err(e) = self.log.mark_complete(&link) {
                    tracing::warn!("Failed to record {} in completion log: {}", link, e);
                }
                continue;
            }

            tasks.push(DownloadTask {
                url: link,
                dest_dir: dest_dir.clone(),
            });
        }

        // Reversed so the first-listed subdirectory is popped next.
        for sub in subdirectories.into_iter().rev() {
            pending.push(sub);
        }
    }

    /// True when a non-empty file named after `url` already sits in `dest_dir`
    async fn already_downloaded(&self, url: &str, dest_dir: &Path) -> bool {
        let Some(name) = file_name(url) else {
            return false;
        };
        match tokio::fs::metadata(dest_dir.join(name)).await {
            Ok(meta) => meta.len() > 0,
            Err(_) => false,
        }
    }

    async fn fetch_text(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
}
