//! Step loop behind the `scrape` command.

use std::time::Duration;

use exam_scraper_pipeline::{Pipeline, ScrapeError};
use exam_scraper_pipeline_models::{PipelinePhase, ScraperSettings, ScraperState};

use crate::state_file::StateFileError;

/// How many steps to run and how to pace retries.
#[derive(Debug, Clone, Copy)]
pub struct StepOptions {
    /// Keep stepping until the state is complete.
    pub until_complete: bool,
    /// Upper bound on steps when looping; `None` is unbounded.
    pub max_steps: Option<u32>,
    /// Pause after an interrupted step before the next one.
    pub retry_delay: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    StateFile(#[from] StateFileError),
}

/// Runs pipeline steps, handing every returned state to `persist` before
/// deciding whether to continue.
///
/// # Errors
///
/// Returns [`StepError`] on configuration errors or if persisting fails.
/// Fetch failures only interrupt a step.
pub async fn run_steps<F>(
    pipeline: &Pipeline,
    mut state: ScraperState,
    settings: &ScraperSettings,
    options: StepOptions,
    mut persist: F,
) -> Result<ScraperState, StepError>
where
    F: FnMut(&ScraperState) -> Result<(), StateFileError>,
{
    let provider = state.provider.clone();
    let exam_code = state.exam_code.clone();
    let mut steps = 0u32;

    loop {
        state = pipeline
            .continue_scrape(&provider, &exam_code, &state, settings)
            .await?;
        steps += 1;
        persist(&state)?;

        let phase = state.phase();
        log::info!(
            "Step {steps}: {} ({} links, {} questions)",
            phase.label(),
            state.question_links.len(),
            state.questions.len(),
        );

        if phase == PipelinePhase::Complete || !options.until_complete {
            break;
        }
        if phase == PipelinePhase::NoLinks {
            log::warn!("No question links found for {provider}/{exam_code}");
            break;
        }
        if options.max_steps.is_some_and(|max| steps >= max) {
            log::warn!("Stopping after {steps} steps; run again to resume");
            break;
        }

        if phase.is_interrupted() && !options.retry_delay.is_zero() {
            log::info!("Resuming in {:?}", options.retry_delay);
            tokio::time::sleep(options.retry_delay).await;
        }
    }

    Ok(state)
}
