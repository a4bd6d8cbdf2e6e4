//! Link discovery over a provider's discussion-list pages.

use std::collections::HashSet;

use exam_scraper_pipeline_models::{BatchResult, BatchSettings, FIRST_DISCUSSION_PAGE};

use crate::batch::run_batches;
use crate::progress::ProgressCallback;
use crate::{QuestionSource, ScrapeError};

/// Collects question links from discussion-list pages `start_page..=last`.
///
/// Links already in `existing_links` (and repeats across pages) are
/// dropped; the remaining links keep first-seen order.
///
/// On partial status, [`BatchResult::last_index`] is the absolute 1-based
/// page at which a later call must resume. If the page count itself cannot
/// be fetched, the result is partial at `start_page` with no links.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if `settings` are invalid.
pub async fn get_question_links(
    source: &dyn QuestionSource,
    provider: &str,
    exam_code: &str,
    start_page: u32,
    existing_links: &[String],
    settings: BatchSettings,
    progress: &dyn ProgressCallback,
) -> Result<BatchResult<String>, ScrapeError> {
    settings.validate("questionLinks")?;

    let start_page = start_page.max(FIRST_DISCUSSION_PAGE);

    let page_count = match source.discussion_page_count(provider, exam_code).await {
        Ok(count) => count,
        Err(err) => {
            let e = ScrapeError::PageFetch {
                page: FIRST_DISCUSSION_PAGE,
                source: err,
            };
            log::warn!("{provider}/{exam_code}: could not determine page count: {e}");
            return Ok(BatchResult::partial(Vec::new(), start_page as usize));
        }
    };

    let pages: Vec<u32> = (start_page..=page_count).collect();
    log::info!(
        "{provider}/{exam_code}: scanning discussion pages {start_page}-{page_count} ({} pages)",
        pages.len(),
    );
    progress.set_total(pages.len() as u64);
    progress.set_message(format!("Discovering {exam_code} links"));

    let result = run_batches(&pages, settings, progress, |&page| async move {
        source
            .fetch_discussion_page(provider, exam_code, page)
            .await
            .map_err(|e| ScrapeError::PageFetch { page, source: e })
    })
    .await?;

    let mut seen: HashSet<String> = existing_links.iter().cloned().collect();
    let links: Vec<String> = result
        .data
        .items
        .into_iter()
        .flatten()
        .filter(|link| seen.insert(link.clone()))
        .collect();

    log::info!("{provider}/{exam_code}: found {} new links", links.len());

    Ok(match result.data.last_index {
        Some(offset) => BatchResult::partial(links, start_page as usize + offset),
        None => BatchResult::success(links),
    })
}
