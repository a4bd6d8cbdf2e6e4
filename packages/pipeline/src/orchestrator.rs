//! Resume state machine tying link discovery and question fetching
//! together.
//!
//! Each call to [`Pipeline::continue_scrape`] inspects the
//! [`PipelinePhase`] of the given state and performs the next step:
//!
//! ```text
//! NoLinks / LinksPartial ── discovery ──┬─ partial ─▶ LinksPartial (return)
//!                                       └─ success ─┐
//! LinksCompleteQuestionsPending / QuestionsPartial ◀┘
//!                          ── fetch ──┬─ partial ─▶ QuestionsPartial (return)
//!                                     └─ success ─▶ Complete
//! ```
//!
//! A stage that ends partial always returns control to the caller with a
//! checkpoint. Nothing is retried here; calling again resumes exactly at
//! the checkpoint.

use std::sync::Arc;

use exam_scraper_pipeline_models::{
    BatchSettings, FIRST_DISCUSSION_PAGE, PipelinePhase, ScraperSettings, ScraperState,
};

use crate::progress::{ProgressCallback, null_progress};
use crate::{QuestionSource, ScrapeError, discovery, questions};

/// Drives a [`QuestionSource`] through the two-stage pipeline.
pub struct Pipeline {
    source: Arc<dyn QuestionSource>,
    progress: Arc<dyn ProgressCallback>,
}

impl Pipeline {
    /// Creates a pipeline that reports no progress.
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            progress: null_progress(),
        }
    }

    /// Reports stage progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Performs the next pipeline step for `provider`/`exam_code` and
    /// returns the resulting state.
    ///
    /// A `state` recorded for a different provider or exam code is
    /// discarded and the scrape starts over. The returned state never has
    /// `is_in_progress` set.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] if `settings` are invalid or the
    /// provider or exam code is empty. Fetch failures are reported through
    /// checkpoints in the returned state instead.
    pub async fn continue_scrape(
        &self,
        provider: &str,
        exam_code: &str,
        state: &ScraperState,
        settings: &ScraperSettings,
    ) -> Result<ScraperState, ScrapeError> {
        settings.validate()?;

        if provider.trim().is_empty() || exam_code.trim().is_empty() {
            return Err(ScrapeError::Config {
                message: "provider and exam code are required".to_string(),
            });
        }

        let mut next = if state.belongs_to(provider, exam_code) {
            state.clone()
        } else {
            if !state.provider.is_empty() {
                log::info!(
                    "Resetting state for {}/{} to start {provider}/{exam_code}",
                    state.provider,
                    state.exam_code,
                );
            }
            ScraperState::new(provider, exam_code)
        };
        next.is_in_progress = false;

        let phase = next.phase();
        log::info!("{provider}/{exam_code}: continuing from {}", phase.label());

        match phase {
            PipelinePhase::Complete => return Ok(next),
            PipelinePhase::NoLinks | PipelinePhase::LinksPartial => {
                next = self.discover(next, settings.question_links).await?;
                if next.last_discussion_list_page_index.is_some() {
                    return Ok(next);
                }
                if next.question_links.is_empty() {
                    return Ok(next);
                }
            }
            PipelinePhase::LinksCompleteQuestionsPending | PipelinePhase::QuestionsPartial => {}
        }

        self.fetch_questions(next, settings.questions).await
    }

    async fn discover(
        &self,
        state: ScraperState,
        settings: BatchSettings,
    ) -> Result<ScraperState, ScrapeError> {
        let start_page = state
            .last_discussion_list_page_index
            .unwrap_or(FIRST_DISCUSSION_PAGE);

        let result = discovery::get_question_links(
            self.source.as_ref(),
            &state.provider,
            &state.exam_code,
            start_page,
            &state.question_links,
            settings,
            self.progress.as_ref(),
        )
        .await?;

        let checkpoint = result
            .last_index()
            .map(|page| u32::try_from(page).unwrap_or(u32::MAX));

        let mut question_links = state.question_links;
        question_links.extend(result.data.items);

        match checkpoint {
            Some(page) => {
                self.progress
                    .finish(format!("Link discovery interrupted at page {page}"));
                log::warn!(
                    "{}/{}: link discovery stopped at page {page} with {} links",
                    state.provider,
                    state.exam_code,
                    question_links.len(),
                );
            }
            None if question_links.is_empty() => {
                self.progress.finish("No question links found".to_string());
                log::warn!(
                    "{}/{}: no question links found",
                    state.provider,
                    state.exam_code,
                );
            }
            None => {
                self.progress
                    .finish(format!("Discovered {} links", question_links.len()));
            }
        }

        Ok(ScraperState {
            question_links,
            last_discussion_list_page_index: checkpoint,
            ..state
        })
    }

    async fn fetch_questions(
        &self,
        state: ScraperState,
        settings: BatchSettings,
    ) -> Result<ScraperState, ScrapeError> {
        let offset = state
            .question_resume_offset()
            .min(state.question_links.len());
        let pending = &state.question_links[offset..];

        if pending.len() + offset <= state.questions.len() {
            log::info!("{}/{}: all questions fetched", state.provider, state.exam_code);
            return Ok(ScraperState {
                last_question_link_index: None,
                ..state
            });
        }

        if offset > 0 {
            log::info!(
                "{}/{}: resuming question fetch at link {offset} of {}",
                state.provider,
                state.exam_code,
                state.question_links.len(),
            );
        }

        let result = questions::get_questions(
            self.source.as_ref(),
            pending,
            settings,
            self.progress.as_ref(),
        )
        .await?;

        let checkpoint = result.last_index().map(|i| offset + i);

        let mut questions = state.questions;
        questions.truncate(offset);
        questions.extend(result.data.items);

        if let Some(index) = checkpoint {
            self.progress
                .finish(format!("Question fetch interrupted at link {index}"));
            log::warn!(
                "{}/{}: question fetch stopped at link {index} of {}",
                state.provider,
                state.exam_code,
                state.question_links.len(),
            );
        } else {
            self.progress
                .finish(format!("Fetched {} questions", questions.len()));
        }

        Ok(ScraperState {
            questions,
            last_question_link_index: checkpoint,
            ..state
        })
    }
}
