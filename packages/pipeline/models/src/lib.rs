#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scraper state, question, batch result, and settings types.
//!
//! These types are shared by the pipeline, the HTTP API, and the CLI. Every
//! type serializes to camelCase JSON so that a state snapshot written by one
//! caller can be handed back verbatim by another.

pub mod settings;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use settings::{BatchSettings, ScraperSettings, SettingsError};

/// The first discussion-list page. Pages are 1-based on the source site.
pub const FIRST_DISCUSSION_PAGE: u32 = 1;

/// A single scraped exam question.
///
/// Created as an empty shell (URL only) when a link is discovered and
/// enriched with its body, topic, and index once the question page has been
/// fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Canonical URL of the question discussion page. Unique key.
    pub url: String,
    /// Topic number the question belongs to.
    #[serde(default)]
    pub topic: u32,
    /// Ordinal of the question within its topic.
    #[serde(default)]
    pub index: u32,
    /// Question text.
    #[serde(default)]
    pub body: String,
    /// User annotation ("starred"). Never set by the pipeline.
    #[serde(default)]
    pub marked: bool,
    /// Answer choices in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Suggested answer as published by the source site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Explanation accompanying the suggested answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_description: Option<String>,
    /// Provider-specific fields the pipeline does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Question {
    /// Creates an empty-shell question for a freshly discovered link.
    #[must_use]
    pub fn shell(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            ..Self::default()
        }
    }
}

/// Where a [`ScraperState`] sits in the two-stage pipeline.
///
/// Derived from the state on demand; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelinePhase {
    /// No question links have been discovered yet.
    NoLinks,
    /// Link discovery was interrupted and has a page checkpoint.
    LinksPartial,
    /// Every link is known but questions have not been fetched yet.
    LinksCompleteQuestionsPending,
    /// Question fetching was interrupted and has a link-offset checkpoint.
    QuestionsPartial,
    /// Every discovered link has a fetched question.
    Complete,
}

impl PipelinePhase {
    /// Human-readable label for progress output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoLinks => "not started",
            Self::LinksPartial => "link discovery interrupted",
            Self::LinksCompleteQuestionsPending => "questions pending",
            Self::QuestionsPartial => "question fetch interrupted",
            Self::Complete => "complete",
        }
    }

    /// Whether a previous run stopped at a checkpoint that can be resumed.
    #[must_use]
    pub const fn is_interrupted(self) -> bool {
        matches!(self, Self::LinksPartial | Self::QuestionsPartial)
    }
}

/// Resumable snapshot of a scrape for one provider and exam code.
///
/// Treated as an immutable value: every pipeline step returns a new state
/// rather than editing the one it was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperState {
    /// Provider id on the source site (e.g. `"amazon"`).
    #[serde(default)]
    pub provider: String,
    /// Exam code within the provider (e.g. `"saa-c03"`).
    #[serde(default)]
    pub exam_code: String,
    /// Discussion-list checkpoint: the 1-based page at which link discovery
    /// resumes. `None` once discovery has finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_discussion_list_page_index: Option<u32>,
    /// Discovered question links in discovery order.
    #[serde(default)]
    pub question_links: Vec<String>,
    /// Question-fetch checkpoint: offset into `question_links` already
    /// fetched. `None` when no question fetch was interrupted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_question_link_index: Option<usize>,
    /// Fetched questions, aligned with `question_links`.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// UI-only flag set by callers while a step is running.
    #[serde(default)]
    pub is_in_progress: bool,
}

impl ScraperState {
    /// Creates a fresh state with no progress.
    #[must_use]
    pub fn new(provider: &str, exam_code: &str) -> Self {
        Self {
            provider: provider.to_owned(),
            exam_code: exam_code.to_owned(),
            ..Self::default()
        }
    }

    /// Returns `true` if this state was produced for the given provider and
    /// exam code. Exam codes compare case-insensitively.
    #[must_use]
    pub fn belongs_to(&self, provider: &str, exam_code: &str) -> bool {
        self.provider == provider && self.exam_code.eq_ignore_ascii_case(exam_code)
    }

    /// Derives the pipeline phase from the checkpoints and counts.
    #[must_use]
    pub fn phase(&self) -> PipelinePhase {
        if self.last_discussion_list_page_index.is_some() {
            PipelinePhase::LinksPartial
        } else if self.question_links.is_empty() {
            PipelinePhase::NoLinks
        } else if self.questions.len() >= self.question_links.len() {
            PipelinePhase::Complete
        } else if self.last_question_link_index.is_some() {
            PipelinePhase::QuestionsPartial
        } else {
            PipelinePhase::LinksCompleteQuestionsPending
        }
    }

    /// Offset into `question_links` at which question fetching resumes.
    ///
    /// Never exceeds the number of questions already held, so a checkpoint
    /// that runs ahead of the data cannot skip an unfetched link.
    #[must_use]
    pub fn question_resume_offset(&self) -> usize {
        self.last_question_link_index
            .unwrap_or(self.questions.len())
            .min(self.questions.len())
    }

    /// Returns `true` once every discovered link has a fetched question.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase() == PipelinePhase::Complete
    }
}

/// Outcome of a batched run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Every input was processed.
    Success,
    /// Processing stopped at a failure; resume at `last_index`.
    Partial,
}

/// Payload of a [`BatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchData<T> {
    /// Outputs for inputs `[0, last_index)` on partial, all inputs on
    /// success, in input order.
    pub items: Vec<T>,
    /// First unprocessed input on partial status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_index: Option<usize>,
}

/// Result of running a sequence of fetches through the batch executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult<T> {
    /// Whether the run covered every input.
    pub status: BatchStatus,
    /// Outputs and, on partial status, the resume index.
    pub data: BatchData<T>,
}

impl<T> BatchResult<T> {
    /// A run that processed every input.
    #[must_use]
    pub const fn success(items: Vec<T>) -> Self {
        Self {
            status: BatchStatus::Success,
            data: BatchData {
                items,
                last_index: None,
            },
        }
    }

    /// A run that stopped before `last_index`.
    #[must_use]
    pub const fn partial(items: Vec<T>, last_index: usize) -> Self {
        Self {
            status: BatchStatus::Partial,
            data: BatchData {
                items,
                last_index: Some(last_index),
            },
        }
    }

    /// The resume index, present only on partial status.
    #[must_use]
    pub const fn last_index(&self) -> Option<usize> {
        self.data.last_index
    }
}
