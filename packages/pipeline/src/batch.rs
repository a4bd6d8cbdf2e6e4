//! Rate-limited batch executor.
//!
//! Splits the input into consecutive batches of `batch_size`. Fetches
//! inside a batch run concurrently; batches run strictly one after another
//! with `sleep_duration` between them so the source site never sees
//! back-to-back bursts.
//!
//! The first failing batch ends the run. The result keeps every output
//! before the lowest failing index and reports that index as the resume
//! point, so a retry never skips an unfetched input and never refetches a
//! kept one.

use std::fmt::Display;
use std::future::Future;

use exam_scraper_pipeline_models::{BatchResult, BatchSettings};
use futures::future::join_all;

use crate::ScrapeError;
use crate::progress::ProgressCallback;

/// Runs `fetch_one` over `items` in rate-limited batches.
///
/// Outputs are returned in input order regardless of completion order.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if `settings.batch_size` is zero. Fetch
/// failures are never returned as errors; they produce a partial result.
pub async fn run_batches<I, O, E, F, Fut>(
    items: &[I],
    settings: BatchSettings,
    progress: &dyn ProgressCallback,
    fetch_one: F,
) -> Result<BatchResult<O>, ScrapeError>
where
    F: Fn(&I) -> Fut,
    Fut: Future<Output = Result<O, E>>,
    E: Display,
{
    if settings.batch_size == 0 {
        return Err(ScrapeError::Config {
            message: "batch size must be greater than zero".to_string(),
        });
    }

    if items.is_empty() {
        return Ok(BatchResult::success(Vec::new()));
    }

    let batch_size = usize::try_from(settings.batch_size).unwrap_or(usize::MAX);
    let total_batches = items.len().div_ceil(batch_size);
    let mut outputs = Vec::with_capacity(items.len());

    for (batch_num, chunk) in items.chunks(batch_size).enumerate() {
        let batch_start = batch_num * batch_size;

        if batch_num > 0 && settings.sleep_duration > 0 {
            log::debug!("Sleeping {}ms before next batch", settings.sleep_duration);
            tokio::time::sleep(settings.sleep()).await;
        }

        log::debug!(
            "Batch {}/{total_batches}: items {}-{} of {}",
            batch_num + 1,
            batch_start + 1,
            batch_start + chunk.len(),
            items.len(),
        );

        let results = join_all(chunk.iter().map(&fetch_one)).await;

        let mut first_failure: Option<usize> = None;
        for (offset, result) in results.into_iter().enumerate() {
            let index = batch_start + offset;
            match result {
                Ok(output) if first_failure.is_none() => {
                    outputs.push(output);
                    progress.inc(1);
                }
                Ok(_) => {
                    log::debug!("Discarding item {index}: an earlier item in its batch failed");
                }
                Err(e) => {
                    log::warn!("Item {index} failed: {e}");
                    first_failure.get_or_insert(index);
                }
            }
        }

        if let Some(index) = first_failure {
            log::warn!(
                "Stopping after batch {}/{total_batches}: {index} of {} items kept",
                batch_num + 1,
                items.len(),
            );
            return Ok(BatchResult::partial(outputs, index));
        }
    }

    Ok(BatchResult::success(outputs))
}
