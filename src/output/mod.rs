//! Run summary aggregation and reporting
//!
//! User-visible behavior at the end of a run is a summary of success,
//! failure, and skip counts; no structured error objects are surfaced.

use crate::crawl::TaskCounts;
use chrono::{DateTime, Utc};

/// Aggregated result of one mirror run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Per-file counters accumulated over every processed root
    pub counts: TaskCounts,

    /// Manifest rows excluded by the format filter
    pub filtered: u64,

    /// Roots skipped because the log already marks them processed
    pub roots_skipped: u64,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            counts: TaskCounts::default(),
            filtered: 0,
            roots_skipped: 0,
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints the end-of-run summary to stdout
pub fn print_summary(summary: &RunSummary, resume: bool, format_filter: Option<&str>) {
    let elapsed = Utc::now() - summary.started_at;

    println!("\n=== Mirror Summary ===\n");
    println!("Succeeded: {}", summary.counts.success);
    println!("Failed: {}", summary.counts.failure);
    println!("Skipped (already downloaded): {}", summary.counts.skipped);

    if resume && summary.roots_skipped > 0 {
        println!("Roots skipped (already processed): {}", summary.roots_skipped);
    }

    if let Some(filter) = format_filter {
        println!("Filtered (format != '{}'): {}", filter, summary.filtered);
    }

    println!("Elapsed: {}s", elapsed.num_seconds());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_summary_is_zeroed() {
        let summary = RunSummary::new();
        assert_eq!(summary.counts, TaskCounts::default());
        assert_eq!(summary.filtered, 0);
        assert_eq!(summary.roots_skipped, 0);
    }

    #[test]
    fn test_counters_accumulate_across_roots() {
        let mut summary = RunSummary::new();
        summary.counts.merge(TaskCounts {
            success: 3,
            failure: 1,
            skipped: 0,
        });
        summary.counts.merge(TaskCounts {
            success: 2,
            failure: 0,
            skipped: 4,
        });

        assert_eq!(summary.counts.success, 5);
        assert_eq!(summary.counts.failure, 1);
        assert_eq!(summary.counts.skipped, 4);
    }
}
