//! Export of completed scrapes and import of previously exported files.
//!
//! An export is the bare JSON array of questions, named
//! `{provider}-{examCode}-{count}.json`. Import accepts either that array or
//! a full [`ScraperState`] snapshot and trusts it as-is beyond its JSON
//! shape.

use exam_scraper_pipeline_models::{PipelinePhase, Question, ScraperState};

/// Errors that can occur while exporting a state.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Only complete scrapes can be exported.
    #[error("Scrape for {provider}/{exam_code} is not complete ({})", phase.label())]
    Incomplete {
        /// Provider of the state.
        provider: String,
        /// Exam code of the state.
        exam_code: String,
        /// Phase the state is in.
        phase: PipelinePhase,
    },

    /// Serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while importing a file.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file is not valid JSON or does not match either accepted shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON parsed but is neither a question array nor a state object.
    #[error("Unsupported import shape: expected a question array or a scraper state object")]
    Shape,
}

/// A serialized export ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct Export {
    /// Suggested file name.
    pub file_name: String,
    /// UTF-8 JSON body.
    pub contents: Vec<u8>,
}

/// Returns the download file name for a state's questions.
#[must_use]
pub fn export_file_name(state: &ScraperState) -> String {
    format!(
        "{}-{}-{}.json",
        state.provider,
        state.exam_code,
        state.questions.len()
    )
}

/// Serializes the questions of a complete state.
///
/// # Errors
///
/// Returns [`ExportError::Incomplete`] unless the state is complete, or
/// [`ExportError::Json`] if serialization fails.
pub fn export_questions(state: &ScraperState) -> Result<Export, ExportError> {
    let phase = state.phase();
    if phase != PipelinePhase::Complete {
        return Err(ExportError::Incomplete {
            provider: state.provider.clone(),
            exam_code: state.exam_code.clone(),
            phase,
        });
    }

    Ok(Export {
        file_name: export_file_name(state),
        contents: serde_json::to_vec(&state.questions)?,
    })
}

/// Parses an imported file into a state.
///
/// A bare question array becomes a complete state for `provider` and
/// `exam_code` whose links are the question URLs. A state object is taken
/// verbatim; an empty provider or exam code in it is filled from the
/// arguments.
///
/// # Errors
///
/// Returns [`ImportError`] if the bytes are not JSON of either shape.
pub fn import_state(
    contents: &[u8],
    provider: &str,
    exam_code: &str,
) -> Result<ScraperState, ImportError> {
    let value: serde_json::Value = serde_json::from_slice(contents)?;

    match value {
        serde_json::Value::Array(_) => {
            let questions: Vec<Question> = serde_json::from_value(value)?;
            log::info!(
                "Imported {} questions for {provider}/{exam_code}",
                questions.len()
            );
            Ok(ScraperState {
                question_links: questions.iter().map(|q| q.url.clone()).collect(),
                questions,
                ..ScraperState::new(provider, exam_code)
            })
        }
        serde_json::Value::Object(_) => {
            let mut state: ScraperState = serde_json::from_value(value)?;
            if state.provider.is_empty() {
                provider.clone_into(&mut state.provider);
            }
            if state.exam_code.is_empty() {
                exam_code.clone_into(&mut state.exam_code);
            }
            state.is_in_progress = false;
            log::info!(
                "Imported state for {}/{} ({})",
                state.provider,
                state.exam_code,
                state.phase().label()
            );
            Ok(state)
        }
        _ => Err(ImportError::Shape),
    }
}
