//! Question page fetching.

use exam_scraper_pipeline_models::{BatchResult, BatchSettings, Question};

use crate::batch::run_batches;
use crate::progress::ProgressCallback;
use crate::{QuestionSource, ScrapeError};

/// Fetches one question per link, in link order.
///
/// Each returned [`Question`] carries the link it was fetched from as its
/// `url`. On partial status, [`BatchResult::last_index`] is an offset into
/// `links`.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if `settings` are invalid.
pub async fn get_questions(
    source: &dyn QuestionSource,
    links: &[String],
    settings: BatchSettings,
    progress: &dyn ProgressCallback,
) -> Result<BatchResult<Question>, ScrapeError> {
    settings.validate("questions")?;

    log::info!("Fetching {} questions from {}", links.len(), source.id());
    progress.set_total(links.len() as u64);
    progress.set_message("Fetching questions".to_string());

    run_batches(links, settings, progress, |url: &String| {
        let url = url.clone();
        async move {
            match source.fetch_question(&url).await {
                Ok(question) => Ok(Question { url, ..question }),
                Err(e) => Err(ScrapeError::QuestionFetch { url, source: e }),
            }
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use exam_scraper_pipeline_models::BatchStatus;

    use super::*;
    use crate::progress::NullProgress;
    use crate::testing::FakeSource;

    #[tokio::test]
    async fn keeps_link_order_and_sets_url() {
        let source = FakeSource::with_pages(&[3, 2]);
        let links = source.all_links();

        let result = get_questions(&source, &links, BatchSettings::new(2, 0), &NullProgress)
            .await
            .unwrap();

        assert_eq!(result.status, BatchStatus::Success);
        let urls: Vec<&str> = result.data.items.iter().map(|q| q.url.as_str()).collect();
        assert_eq!(urls, links);
        assert_eq!(result.data.items[3].topic, 2);
        assert_eq!(result.data.items[3].index, 0);
    }

    #[tokio::test]
    async fn failure_offset_indexes_into_links() {
        let source = FakeSource::with_pages(&[5]);
        let links = source.all_links();
        source.fail_url(&links[3]);

        let result = get_questions(&source, &links, BatchSettings::new(2, 0), &NullProgress)
            .await
            .unwrap();

        assert_eq!(result.status, BatchStatus::Partial);
        assert_eq!(result.last_index(), Some(3));
        assert_eq!(result.data.items.len(), 3);
        // The last batch is never dispatched.
        assert!(!source.question_calls().contains(&links[4]));
    }

    #[tokio::test]
    async fn resuming_from_offset_completes_the_list() {
        let source = FakeSource::with_pages(&[6]);
        let links = source.all_links();
        source.fail_url(&links[2]);

        let first = get_questions(&source, &links, BatchSettings::new(4, 0), &NullProgress)
            .await
            .unwrap();
        let offset = first.last_index().unwrap();

        source.heal();
        let second = get_questions(
            &source,
            &links[offset..],
            BatchSettings::new(4, 0),
            &NullProgress,
        )
        .await
        .unwrap();

        assert_eq!(source.question_calls(), links[offset..].to_vec());
        let combined: Vec<String> = first
            .data
            .items
            .into_iter()
            .chain(second.data.items)
            .map(|q| q.url)
            .collect();
        assert_eq!(combined, links);
    }
}
