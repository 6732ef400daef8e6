//! Batch splitting and result merging

use crate::submitter::{SubmitResult, Submitter};

/// Batch size used when the caller passes 0
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Submits `urls` in contiguous chunks of at most `batch_size`
///
/// Chunks are submitted strictly one after another, in order; one result is
/// returned per chunk.
pub async fn batch_submit(
    submitter: &dyn Submitter,
    urls: &[String],
    batch_size: usize,
) -> Vec<SubmitResult> {
    let batch_size = if batch_size == 0 {
        DEFAULT_BATCH_SIZE
    } else {
        batch_size
    };

    let mut results = Vec::with_capacity(urls.len().div_ceil(batch_size));
    for (index, chunk) in urls.chunks(batch_size).enumerate() {
        tracing::debug!(
            "{}: submitting batch {} ({} URLs)",
            submitter.name(),
            index + 1,
            chunk.len()
        );
        results.push(submitter.submit(chunk).await);
    }
    results
}

/// Folds per-batch results into one
///
/// Counts are summed and URL lists concatenated in order. Only the first
/// error survives.
pub fn merge_results(results: Vec<SubmitResult>) -> SubmitResult {
    let mut iter = results.into_iter();
    let Some(mut merged) = iter.next() else {
        return SubmitResult::default();
    };

    for result in iter {
        merged.total_count += result.total_count;
        merged.success_count += result.success_count;
        merged.failed_count += result.failed_count;
        merged.failed_urls.extend(result.failed_urls);
        merged.succeeded_urls.extend(result.succeeded_urls);
        if merged.error.is_none() {
            merged.error = result.error;
        }
    }
    merged
}

/// Submits every URL in batches and merges the outcome
pub async fn submit_all(
    submitter: &dyn Submitter,
    urls: &[String],
    batch_size: usize,
) -> SubmitResult {
    let mut merged = merge_results(batch_submit(submitter, urls, batch_size).await);
    if merged.platform.is_empty() {
        merged.platform = submitter.name().to_string();
    }
    merged
}
