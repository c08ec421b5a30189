//! Persistent completion log
//!
//! The log records every URL that has been fully downloaded into a mirror
//! tree, as a single JSON document with one `downloaded_urls` array, stored
//! at the root of the output directory. It is the source of truth for resume
//! runs: a URL present in the log implies a non-empty local file existed at
//! the time of logging.
//!
//! Loading fails soft. A missing or unparseable log yields an empty one, or,
//! in resume mode, a log reconstructed by scanning the mirror tree and
//! reconstituting URLs from relative file paths.
//!
//! All mutations go through an in-memory set behind a mutex; the set is
//! written out as a whole on a bounded schedule rather than on every single
//! insertion, plus at explicit flush points. The log only grows: nothing
//! ever removes an entry during a session.

use crate::url::url_from_relative_path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the completion log within the output root
pub const LOG_FILE_NAME: &str = "downloads_completed.json";

/// On-disk document shape
#[derive(Debug, Default, Serialize, Deserialize)]
struct LogDocument {
    downloaded_urls: Vec<String>,
}

#[derive(Debug, Default)]
struct LogInner {
    urls: HashSet<String>,
    dirty: usize,
}

/// Process-wide record of fully downloaded URLs for one output root
#[derive(Debug)]
pub struct CompletionLog {
    path: PathBuf,
    flush_interval: usize,
    inner: Mutex<LogInner>,
}

impl CompletionLog {
    /// Loads the completion log for an output root
    ///
    /// # Arguments
    ///
    /// * `output_root` - Root of the local mirror tree
    /// * `resume` - Whether prior progress should be trusted; enables
    ///   reconstruction from the file tree when the log file is missing or
    ///   corrupt
    /// * `flush_interval` - Insertions between flushes to disk
    pub fn load(output_root: &Path, resume: bool, flush_interval: usize) -> Self {
        let path = output_root.join(LOG_FILE_NAME);

        let mut rebuilt = false;
        let urls = if path.exists() {
            match read_document(&path) {
                Ok(doc) => doc.downloaded_urls.into_iter().collect(),
                Err(e) => {
                    tracing::warn!("Completion log {} is unreadable: {}", path.display(), e);
                    if resume {
                        rebuilt = true;
                        scan_existing_files(output_root)
                    } else {
                        HashSet::new()
                    }
                }
            }
        } else if resume && output_root.exists() {
            rebuilt = true;
            scan_existing_files(output_root)
        } else {
            HashSet::new()
        };

        let log = Self {
            path,
            flush_interval: flush_interval.max(1),
            inner: Mutex::new(LogInner {
                dirty: if rebuilt { urls.len() } else { 0 },
                urls,
            }),
        };

        if rebuilt {
            tracing::info!(
                "Reconstructed completion log with {} entries from existing files",
                log.len()
            );
            if let Err(e) = log.flush() {
                tracing::warn!("Failed to persist reconstructed log: {}", e);
            }
        }

        log
    }

    /// Returns true if `url` is recorded as fully downloaded
    pub fn contains(&self, url: &str) -> bool {
        self.inner.lock().unwrap().urls.contains(url)
    }

    /// Records `url` as fully downloaded
    ///
    /// The entry is inserted if absent and the document is written out once
    /// enough insertions have accumulated since the last write.
    pub fn mark_complete(&self, url: &str) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.urls.insert(url.to_string()) {
            inner.dirty += 1;
        }
        if inner.dirty >= self.flush_interval {
            write_document(&self.path, &inner.urls)?;
            inner.dirty = 0;
        }
        Ok(())
    }

    /// Writes any unpersisted entries to disk
    pub fn flush(&self) -> io::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.dirty > 0 {
            write_document(&self.path, &inner.urls)?;
            inner.dirty = 0;
        }
        Ok(())
    }

    /// Number of recorded URLs
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().urls.len()
    }

    /// Returns true if no URL has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_document(path: &Path) -> io::Result<LogDocument> {
    let content = std::fs::read_to_string(path)?;
    let doc: LogDocument = serde_json::from_str(&content)?;
    Ok(doc)
}

fn write_document(path: &Path, urls: &HashSet<String>) -> io::Result<()> {
    let mut downloaded_urls: Vec<String> = urls.iter().cloned().collect();
    downloaded_urls.sort();
    let doc = LogDocument { downloaded_urls };
    let json = serde_json::to_string_pretty(&doc)?;
    std::fs::write(path, json)
}

/// Rebuilds the set of completed URLs by scanning the mirror tree
///
/// Every non-empty file below `output_root` (except the log itself) is
/// assumed to be a finished download and its URL is reconstituted from the
/// relative path.
fn scan_existing_files(output_root: &Path) -> HashSet<String> {
    tracing::info!(
        "Scanning {} for previously downloaded files",
        output_root.display()
    );

    let mut urls = HashSet::new();
    let mut pending = vec![output_root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Cannot read directory {}: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }

            if path.file_name().map(|n| n == LOG_FILE_NAME).unwrap_or(false) {
                continue;
            }

            let non_empty = std::fs::metadata(&path)
                .map(|meta| meta.len() > 0)
                .unwrap_or(false);
            if !non_empty {
                continue;
            }

            if let Ok(rel) = path.strip_prefix(output_root) {
                if let Some(url) = url_from_relative_path(rel) {
                    urls.insert(url);
                }
            }
        }
    }

    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_missing_log_without_resume() {
        let dir = TempDir::new().unwrap();
        let log = CompletionLog::load(dir.path(), false, 25);
        assert!(log.is_empty());
    }

    #[test]
    fn test_load_existing_log() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(LOG_FILE_NAME),
            r#"{"downloaded_urls": ["https://example.org/data/a.csv"]}"#,
        )
        .unwrap();

        let log = CompletionLog::load(dir.path(), false, 25);
        assert_eq!(log.len(), 1);
        assert!(log.contains("https://example.org/data/a.csv"));
    }

    #[test]
    fn test_corrupt_log_falls_back_to_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LOG_FILE_NAME), "{not json").unwrap();

        let log = CompletionLog::load(dir.path(), false, 25);
        assert!(log.is_empty());
    }

    #[test]
    fn test_corrupt_log_rebuilds_in_resume_mode() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LOG_FILE_NAME), "{not json").unwrap();
        write_file(dir.path(), "example.org/data/file1.csv", b"payload");

        let log = CompletionLog::load(dir.path(), true, 25);
        assert!(log.contains("https://example.org/data/file1.csv"));
    }

    #[test]
    fn test_missing_log_rebuilds_in_resume_mode() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "example.org/data/file1.csv", b"payload");

        let log = CompletionLog::load(dir.path(), true, 25);
        assert_eq!(log.len(), 1);
        assert!(log.contains("https://example.org/data/file1.csv"));

        // The reconstructed log is persisted immediately.
        let doc: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(
            doc["downloaded_urls"][0],
            "https://example.org/data/file1.csv"
        );
    }

    #[test]
    fn test_rebuild_skips_empty_files_and_log_file() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "example.org/data/full.csv", b"payload");
        write_file(dir.path(), "example.org/data/empty.csv", b"");

        let log = CompletionLog::load(dir.path(), true, 25);
        assert_eq!(log.len(), 1);
        assert!(!log.contains("https://example.org/data/empty.csv"));
        assert!(!log.contains(&format!("https://{LOG_FILE_NAME}")));
    }

    #[test]
    fn test_rebuild_skips_top_level_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("stray.txt"), b"payload").unwrap();

        let log = CompletionLog::load(dir.path(), true, 25);
        assert!(log.is_empty());
    }

    #[test]
    fn test_mark_complete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = CompletionLog::load(dir.path(), false, 1);

        log.mark_complete("https://example.org/a.csv").unwrap();
        log.mark_complete("https://example.org/a.csv").unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_flush_interval_defers_writes() {
        let dir = TempDir::new().unwrap();
        let log = CompletionLog::load(dir.path(), false, 10);

        log.mark_complete("https://example.org/a.csv").unwrap();
        assert!(!dir.path().join(LOG_FILE_NAME).exists());

        log.flush().unwrap();
        let doc = read_document(&dir.path().join(LOG_FILE_NAME)).unwrap();
        assert_eq!(doc.downloaded_urls, vec!["https://example.org/a.csv"]);
    }

    #[test]
    fn test_flush_interval_of_one_writes_immediately() {
        let dir = TempDir::new().unwrap();
        let log = CompletionLog::load(dir.path(), false, 1);

        log.mark_complete("https://example.org/a.csv").unwrap();
        assert!(dir.path().join(LOG_FILE_NAME).exists());
    }

    #[test]
    fn test_log_set_is_monotonic_across_reload() {
        let dir = TempDir::new().unwrap();
        {
            let log = CompletionLog::load(dir.path(), false, 1);
            log.mark_complete("https://example.org/a.csv").unwrap();
            log.mark_complete("https://example.org/b.csv").unwrap();
        }

        let log = CompletionLog::load(dir.path(), false, 1);
        assert_eq!(log.len(), 2);
        log.mark_complete("https://example.org/c.csv").unwrap();
        assert_eq!(log.len(), 3);
        assert!(log.contains("https://example.org/a.csv"));
        assert!(log.contains("https://example.org/b.csv"));
    }
}
