#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rate-limited, resumable two-stage scraping pipeline for exam questions.
//!
//! The pipeline first walks a provider's discussion-list pages to discover
//! question links ([`discovery`]), then fetches each question page
//! ([`questions`]). Both stages push their fetches through the
//! [`batch`] executor, which runs fixed-size batches with a pause in
//! between and stops at the first failure, reporting a resume index.
//!
//! [`orchestrator::Pipeline`] ties the stages together: given a
//! [`ScraperState`](exam_scraper_pipeline_models::ScraperState) snapshot it
//! performs the next step and returns a new snapshot carrying checkpoints.
//!
//! The pipeline knows nothing about HTML or HTTP. A [`QuestionSource`]
//! implementation supplies the three fetch primitives.

pub mod batch;
pub mod discovery;
pub mod export;
pub mod orchestrator;
pub mod progress;
pub mod questions;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use exam_scraper_pipeline_models::{Question, SettingsError};

pub use orchestrator::Pipeline;

/// Failure of a single fetch primitive.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying transport error.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request exceeded its timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// The response arrived but did not contain what was expected.
    #[error("could not parse {url}: {message}")]
    Parse {
        /// Requested URL.
        url: String,
        /// What was missing or malformed.
        message: String,
    },
}

/// Errors surfaced by the pipeline.
///
/// Fetch failures ([`Self::PageFetch`], [`Self::QuestionFetch`]) are
/// absorbed by the batch executor and turned into a partial result with a
/// resume index. Only [`Self::Config`] is ever returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// A discussion-list page (or the page count) could not be fetched.
    #[error("discussion list page {page} failed: {source}")]
    PageFetch {
        /// 1-based page index.
        page: u32,
        /// Underlying fetch failure.
        source: FetchError,
    },

    /// A question page could not be fetched.
    #[error("question {url} failed: {source}")]
    QuestionFetch {
        /// Question URL.
        url: String,
        /// Underlying fetch failure.
        source: FetchError,
    },

    /// Settings or inputs were rejected before any fetch started.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the rejected value.
        message: String,
    },
}

impl From<SettingsError> for ScrapeError {
    fn from(value: SettingsError) -> Self {
        Self::Config {
            message: value.to_string(),
        }
    }
}

/// The fetch primitives a question site must provide.
///
/// Implementations own all HTTP and HTML concerns. Every method is a
/// single logical fetch: the pipeline decides batching, pacing, and
/// resumption.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Returns a short identifier for this source (e.g. `"examtopics"`).
    fn id(&self) -> &str;

    /// Returns the number of discussion-list pages for a provider and exam.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the count cannot be determined.
    async fn discussion_page_count(
        &self,
        provider: &str,
        exam_code: &str,
    ) -> Result<u32, FetchError>;

    /// Fetches one 1-based discussion-list page and returns the question
    /// links on it that belong to `exam_code`, in page order.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the page cannot be fetched or parsed.
    async fn fetch_discussion_page(
        &self,
        provider: &str,
        exam_code: &str,
        page: u32,
    ) -> Result<Vec<String>, FetchError>;

    /// Fetches and parses one question page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the page cannot be fetched or parsed.
    async fn fetch_question(&self, url: &str) -> Result<Question, FetchError>;
}
