//! HTML parsing for ExamTopics discussion-list and question pages.
//!
//! These functions are pure so they can be exercised against fixture
//! documents without a network.

use exam_scraper_pipeline_models::Question;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

const PAGE_INDICATOR: &str = ".discussion-list-page-indicator strong";
const DISCUSSION_LINK: &str = "a.discussion-link";
const QUESTION_HEADER: &str = ".question-discussion-header";
const QUESTION_BODY: &str = ".question-body .card-text";
const CHOICE: &str = ".question-choices-container .multi-choice-item";
const CORRECT_ANSWER: &str = ".question-body .correct-answer";
const ANSWER_DESCRIPTION: &str = ".question-body .answer-description";

/// Errors produced while reading a fetched page.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A CSS selector failed to compile.
    #[error("invalid CSS selector '{selector}': {message}")]
    Selector {
        /// The offending selector.
        selector: &'static str,
        /// Parser message.
        message: String,
    },

    /// An element the page must contain was not found.
    #[error("page has no {what}")]
    Missing {
        /// What was looked for.
        what: &'static str,
    },
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        selector: css,
        message: e.to_string(),
    })
}

/// Joins an element's text nodes and collapses runs of whitespace.
fn normalized_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads the total number of discussion-list pages.
///
/// The indicator reads "Page <strong>1</strong> of <strong>N</strong>";
/// the last `strong` holds the total.
///
/// # Errors
///
/// Returns [`ParseError::Missing`] if the indicator is absent or not a
/// number.
pub fn parse_page_count(html: &str) -> Result<u32, ParseError> {
    let document = Html::parse_document(html);
    let indicator = selector(PAGE_INDICATOR)?;

    document
        .select(&indicator)
        .last()
        .and_then(|el| normalized_text(el).parse::<u32>().ok())
        .ok_or(ParseError::Missing {
            what: "discussion page indicator",
        })
}

/// Extracts absolute question links for `exam_code` from a discussion-list
/// page, in document order.
///
/// Discussion lists mix every exam of a provider, so only links whose
/// href or title mentions the exam code are kept.
///
/// # Errors
///
/// Returns [`ParseError::Selector`] if the link selector fails to compile.
pub fn parse_discussion_links(
    html: &str,
    base_url: &str,
    exam_code: &str,
) -> Result<Vec<String>, ParseError> {
    let document = Html::parse_document(html);
    let link = selector(DISCUSSION_LINK)?;
    let exam_code = exam_code.to_lowercase();
    let base_url = base_url.trim_end_matches('/');

    Ok(document
        .select(&link)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            let title = normalized_text(el).to_lowercase();
            if !href.to_lowercase().contains(&exam_code) && !title.contains(&exam_code) {
                return None;
            }
            Some(if href.starts_with("http://") || href.starts_with("https://") {
                href.to_owned()
            } else if href.starts_with('/') {
                format!("{base_url}{href}")
            } else {
                format!("{base_url}/{href}")
            })
        })
        .collect())
}

/// Reads a question page.
///
/// The returned question has an empty `url`; the caller knows where it
/// fetched the page from.
///
/// # Errors
///
/// Returns [`ParseError::Missing`] if the page has no question body.
pub fn parse_question(html: &str) -> Result<Question, ParseError> {
    let document = Html::parse_document(html);

    let body = document
        .select(&selector(QUESTION_BODY)?)
        .next()
        .map(normalized_text)
        .ok_or(ParseError::Missing {
            what: "question body",
        })?;

    let header = document
        .select(&selector(QUESTION_HEADER)?)
        .next()
        .map(normalized_text)
        .unwrap_or_default();

    let choices = document
        .select(&selector(CHOICE)?)
        .map(normalized_text)
        .filter(|choice| !choice.is_empty())
        .collect();

    let answer = document
        .select(&selector(CORRECT_ANSWER)?)
        .next()
        .map(normalized_text)
        .filter(|answer| !answer.is_empty());

    let answer_description = document
        .select(&selector(ANSWER_DESCRIPTION)?)
        .next()
        .map(normalized_text)
        .filter(|description| !description.is_empty());

    Ok(Question {
        topic: header_number(&header, "Topic").unwrap_or_default(),
        index: header_number(&header, "Question").unwrap_or_default(),
        body,
        choices,
        answer,
        answer_description,
        ..Question::default()
    })
}

/// Reads the number following `"{label} #:"` in a question header.
fn header_number(header: &str, label: &str) -> Option<u32> {
    let re = Regex::new(&format!(r"{label} #: ?([0-9]+)")).unwrap_or_else(|_| unreachable!());
    re.captures(header)?.get(1)?.as_str().parse().ok()
}
