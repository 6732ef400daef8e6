//! Output module for run summaries
//!
//! This module handles:
//! - Recording per site/platform submission statistics
//! - Printing a run summary
//! - Printing the history overview used by `--stats`

pub mod stats;

pub use stats::{print_summary, totals, RunTotals, SubmitStats};

use crate::platform::Platform;

/// History size of one site/platform pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryCount {
    pub site: String,
    pub domain: String,
    pub platform: Platform,
    pub count: usize,
}

/// Prints the number of recorded URLs per site and platform
pub fn print_history(counts: &[HistoryCount]) {
    println!("=== Submission History ===\n");

    let mut current_site: Option<&str> = None;
    for entry in counts {
        if current_site != Some(entry.site.as_str()) {
            println!("{} ({}):", entry.site, entry.domain);
            current_site = Some(entry.site.as_str());
        }
        println!("  {:<8} {} URLs", entry.platform.label(), entry.count);
    }

    let total: usize = counts.iter().map(|c| c.count).sum();
    println!("\nTotal recorded: {}", total);
}
