//! Submission adapters for search-engine indexing APIs
//!
//! This module contains:
//! - The [`Submitter`] trait every platform implements
//! - The Baidu push API adapter, with its one-by-one quota fallback
//! - The IndexNow adapter used for Bing and Google
//! - Batch splitting and result merging

mod baidu;
pub mod batch;
mod indexnow;

pub use baidu::{BaiduSubmitter, BAIDU_ENDPOINT};
pub use batch::{batch_submit, merge_results, submit_all, DEFAULT_BATCH_SIZE};
pub use indexnow::{IndexNowSubmitter, INDEXNOW_ENDPOINT};

use crate::platform::Platform;
use async_trait::async_trait;
use thiserror::Error;

/// Why (part of) a submission failed
///
/// Failures are values carried by [`SubmitResult`], never raised, so callers
/// can always inspect partial counts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitFailure {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {message} (body: {body})")]
    Decode { message: String, body: String },

    #[error("daily quota exceeded: {body}")]
    QuotaExceeded { body: String },

    #[error(
        "one-by-one submission: {succeeded} succeeded, {failed} failed{}",
        stop_suffix(.stopped_by)
    )]
    Degraded {
        succeeded: usize,
        failed: usize,
        stopped_by: Option<Box<SubmitFailure>>,
    },
}

fn stop_suffix(stopped_by: &Option<Box<SubmitFailure>>) -> String {
    match stopped_by {
        Some(cause) => format!(", stopped early ({})", cause),
        None => String::new(),
    }
}

/// Outcome of submitting a list of URLs to one platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitResult {
    /// Display label of the submitter
    pub platform: String,
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    /// URLs known to have failed
    pub failed_urls: Vec<String>,
    /// URLs known to have been accepted
    pub succeeded_urls: Vec<String>,
    /// First failure encountered, if any
    pub error: Option<SubmitFailure>,
}

impl SubmitResult {
    /// An empty result for `total` URLs
    pub fn new(platform: impl Into<String>, total: usize) -> Self {
        Self {
            platform: platform.into(),
            total_count: total,
            ..Default::default()
        }
    }

    /// Every URL was accepted
    pub fn accepted(platform: impl Into<String>, urls: &[String]) -> Self {
        Self {
            success_count: urls.len(),
            succeeded_urls: urls.to_vec(),
            ..Self::new(platform, urls.len())
        }
    }

    /// Every URL failed for the same reason
    pub fn rejected(platform: impl Into<String>, urls: &[String], error: SubmitFailure) -> Self {
        Self {
            failed_count: urls.len(),
            failed_urls: urls.to_vec(),
            error: Some(error),
            ..Self::new(platform, urls.len())
        }
    }

    /// True when nothing failed
    pub fn is_success(&self) -> bool {
        self.failed_count == 0 && self.error.is_none()
    }
}

/// A platform that accepts URL submissions
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submits one bounded list of URLs
    ///
    /// An empty list returns a zero-count result without touching the network.
    async fn submit(&self, urls: &[String]) -> SubmitResult;

    /// Display label, e.g. "Bing"
    fn name(&self) -> &str;

    /// Platform this submitter talks to
    fn platform(&self) -> Platform;
}
