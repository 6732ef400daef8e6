//! Structured reporting of submission progress
//!
//! Components never log through a global logger of their own; they receive
//! a [`Reporter`] and emit events through it. [`TracingReporter`] forwards
//! those events to `tracing`, whose subscriber is installed by the binary.

use crate::submitter::SubmitResult;
use std::fmt::Display;

/// Sink for the structured events emitted during a run
pub trait Reporter: Send + Sync {
    /// A batch of URLs is about to be submitted to a platform
    fn submit_started(&self, site: &str, platform: &str, count: usize);

    /// A platform submission finished (possibly with failures)
    fn submit_finished(&self, site: &str, platform: &str, result: &SubmitResult);

    /// A sitemap document was parsed
    fn sitemap_parsed(&self, url: &str, count: usize);

    /// A nested sitemap was skipped
    fn sitemap_skipped(&self, url: &str, reason: &dyn Display);

    /// Submission history was loaded for a site/platform pair
    fn history_loaded(&self, site: &str, platform: &str, count: usize);

    /// Candidate URLs were filtered against history
    fn urls_filtered(&self, site: &str, platform: &str, total: usize, pending: usize);

    /// A failure that was handled but should be surfaced
    fn error(&self, context: &str, error: &dyn Display);
}

/// Reporter that emits `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn submit_started(&self, site: &str, platform: &str, count: usize) {
        tracing::info!(site, platform, count, "Submitting URLs");
    }

    fn submit_finished(&self, site: &str, platform: &str, result: &SubmitResult) {
        if result.failed_count == 0 && result.error.is_none() {
            tracing::info!(
                site,
                platform,
                success = result.success_count,
                "Submission complete"
            );
            return;
        }

        match &result.error {
            Some(error) => tracing::warn!(
                site,
                platform,
                success = result.success_count,
                failed = result.failed_count,
                %error,
                "Submission finished with failures"
            ),
            None => tracing::warn!(
                site,
                platform,
                success = result.success_count,
                failed = result.failed_count,
                "Submission finished with failures"
            ),
        }
        for url in &result.failed_urls {
            tracing::warn!(site, platform, url = %url, "Failed URL");
        }
    }

    fn sitemap_parsed(&self, url: &str, count: usize) {
        tracing::info!(url, count, "Sitemap parsed");
    }

    fn sitemap_skipped(&self, url: &str, reason: &dyn Display) {
        tracing::warn!(url, %reason, "Skipping nested sitemap");
    }

    fn history_loaded(&self, site: &str, platform: &str, count: usize) {
        tracing::info!(site, platform, count, "History loaded");
    }

    fn urls_filtered(&self, site: &str, platform: &str, total: usize, pending: usize) {
        tracing::info!(site, platform, total, pending, "Filtered submitted URLs");
    }

    fn error(&self, context: &str, error: &dyn Display) {
        tracing::error!(%error, "{}", context);
    }
}
