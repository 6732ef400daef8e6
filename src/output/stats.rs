//! Submission statistics
//!
//! This module collects per site/platform counts during a run and prints
//! them as a summary.

use crate::platform::Platform;
use chrono::{DateTime, Utc};

/// Outcome of one site/platform pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitStats {
    /// Site name
    pub site: String,

    /// Platform the URLs went to
    pub platform: Platform,

    /// URLs found in the sitemap
    pub candidate_count: usize,

    /// URLs not yet in the history
    pub pending_count: usize,

    /// URLs sent after applying the quota
    pub submitted_count: usize,

    /// URLs the platform accepted
    pub success_count: usize,

    /// URLs the platform rejected or that were never attempted
    pub failed_count: usize,

    /// History size after the run
    pub history_count: usize,

    /// First error, rendered for display
    pub error: Option<String>,

    /// When the pass finished
    pub timestamp: DateTime<Utc>,
}

impl SubmitStats {
    /// Stats for a pass that has not submitted anything yet
    pub fn new(site: impl Into<String>, platform: Platform) -> Self {
        Self {
            site: site.into(),
            platform,
            candidate_count: 0,
            pending_count: 0,
            submitted_count: 0,
            success_count: 0,
            failed_count: 0,
            history_count: 0,
            error: None,
            timestamp: Utc::now(),
        }
    }
}

/// Totals across every pass of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: usize,
}

/// Sums a run's statistics
pub fn totals(stats: &[SubmitStats]) -> RunTotals {
    stats.iter().fold(RunTotals::default(), |mut acc, s| {
        acc.submitted += s.submitted_count;
        acc.succeeded += s.success_count;
        acc.failed += s.failed_count;
        acc.errors += usize::from(s.error.is_some());
        acc
    })
}

/// Prints a run summary to stdout
pub fn print_summary(stats: &[SubmitStats]) {
    println!("=== Submission Summary ===\n");

    if stats.is_empty() {
        println!("Nothing was submitted.");
        return;
    }

    println!(
        "{:<24} {:<8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Site", "Platform", "Found", "New", "Sent", "OK", "Failed", "History"
    );
    for s in stats {
        println!(
            "{:<24} {:<8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            s.site,
            s.platform.label(),
            s.candidate_count,
            s.pending_count,
            s.submitted_count,
            s.success_count,
            s.failed_count,
            s.history_count
        );
    }
    println!();

    let errors: Vec<_> = stats.iter().filter(|s| s.error.is_some()).collect();
    if !errors.is_empty() {
        println!("Errors:");
        for s in errors {
            println!(
                "  - {} / {}: {}",
                s.site,
                s.platform.label(),
                s.error.as_deref().unwrap_or_default()
            );
        }
        println!();
    }

    let t = totals(stats);
    let success_rate = if t.submitted > 0 {
        (t.succeeded as f64 / t.submitted as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} URLs accepted)",
        success_rate, t.succeeded, t.submitted
    );
}
