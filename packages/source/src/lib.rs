#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ExamTopics implementation of [`QuestionSource`].
//!
//! Discussion-list pages are fetched from
//! `{base}/discussions/{provider}/{page}/` and filtered down to the links of
//! one exam; question pages are parsed into [`Question`]s. Each request has
//! its own timeout and transient failures are retried inside the fetch
//! (see [`retry`]).

pub mod parsing;
pub mod providers;
pub mod retry;

use std::time::Duration;

use async_trait::async_trait;
use exam_scraper_pipeline::{FetchError, QuestionSource};
use exam_scraper_pipeline_models::Question;

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "https://www.examtopics.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const USER_AGENT: &str = concat!("exam-scraper/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while constructing a source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for [`ExamTopicsSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamTopicsConfig {
    /// Site root without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,
}

impl Default for ExamTopicsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ExamTopicsConfig {
    /// Reads `EXAM_SCRAPER_BASE_URL`, `EXAM_SCRAPER_TIMEOUT_SECS` and
    /// `EXAM_SCRAPER_MAX_RETRIES`, falling back to the defaults for unset or
    /// unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("EXAM_SCRAPER_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map_or(defaults.base_url, |url| {
                    url.trim().trim_end_matches('/').to_string()
                }),
            timeout: env_number("EXAM_SCRAPER_TIMEOUT_SECS")
                .map_or(defaults.timeout, Duration::from_secs),
            max_retries: env_number("EXAM_SCRAPER_MAX_RETRIES")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(defaults.max_retries),
        }
    }
}

fn env_number(name: &str) -> Option<u64> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(e) => {
            log::warn!("Ignoring {name}={value:?}: {e}");
            None
        }
    }
}

/// Scrapes discussions and questions from ExamTopics.
pub struct ExamTopicsSource {
    client: reqwest::Client,
    config: ExamTopicsConfig,
}

impl ExamTopicsSource {
    /// Creates a source with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Client`] if the client cannot be built.
    pub fn new(config: ExamTopicsConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        log::debug!(
            "ExamTopics source at {} (timeout {:?}, {} retries)",
            config.base_url,
            config.timeout,
            config.max_retries
        );

        Ok(Self { client, config })
    }

    /// URL of a 1-based discussion-list page.
    #[must_use]
    pub fn discussion_page_url(&self, provider: &str, page: u32) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if page <= 1 {
            format!("{base}/discussions/{provider}/")
        } else {
            format!("{base}/discussions/{provider}/{page}/")
        }
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("GET {url}");
        retry::send_text(url, self.config.max_retries, || self.client.get(url)).await
    }
}

fn parse_error(url: &str, e: &parsing::ParseError) -> FetchError {
    FetchError::Parse {
        url: url.to_owned(),
        message: e.to_string(),
    }
}

#[async_trait]
impl QuestionSource for ExamTopicsSource {
    fn id(&self) -> &'static str {
        "examtopics"
    }

    async fn discussion_page_count(
        &self,
        provider: &str,
        _exam_code: &str,
    ) -> Result<u32, FetchError> {
        let url = self.discussion_page_url(provider, 1);
        let html = self.get(&url).await?;
        parsing::parse_page_count(&html).map_err(|e| parse_error(&url, &e))
    }

    async fn fetch_discussion_page(
        &self,
        provider: &str,
        exam_code: &str,
        page: u32,
    ) -> Result<Vec<String>, FetchError> {
        let url = self.discussion_page_url(provider, page);
        let html = self.get(&url).await?;
        parsing::parse_discussion_links(&html, &self.config.base_url, exam_code)
            .map_err(|e| parse_error(&url, &e))
    }

    async fn fetch_question(&self, url: &str) -> Result<Question, FetchError> {
        let html = self.get(url).await?;
        let question = parsing::parse_question(&html).map_err(|e| parse_error(url, &e))?;
        Ok(Question {
            url: url.to_owned(),
            ..question
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(base_url: &str) -> ExamTopicsSource {
        ExamTopicsSource::new(ExamTopicsConfig {
            base_url: base_url.to_string(),
            ..ExamTopicsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn first_page_has_no_number() {
        let source = source("https://www.examtopics.com");
        assert_eq!(
            source.discussion_page_url("amazon", 1),
            "https://www.examtopics.com/discussions/amazon/"
        );
        assert_eq!(
            source.discussion_page_url("amazon", 7),
            "https://www.examtopics.com/discussions/amazon/7/"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_ignored() {
        let source = source("http://localhost:8000/");
        assert_eq!(
            source.discussion_page_url("cisco", 2),
            "http://localhost:8000/discussions/cisco/2/"
        );
    }

    #[test]
    fn default_config() {
        let config = ExamTopicsConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_request_error() {
        let source = ExamTopicsSource::new(ExamTopicsConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            max_retries: 0,
        })
        .unwrap();

        let err = source.discussion_page_count("amazon", "saa-c03").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Request { .. } | FetchError::Timeout { .. }
        ));
    }
}
