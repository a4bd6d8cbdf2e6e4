//! In-memory fakes shared by the pipeline tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use exam_scraper_pipeline_models::Question;

use crate::progress::ProgressCallback;
use crate::{FetchError, QuestionSource};

/// Counts completed units.
#[derive(Default)]
pub struct CountingProgress {
    completed: AtomicU64,
}

impl CountingProgress {
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

impl ProgressCallback for CountingProgress {
    fn set_total(&self, _total: u64) {}

    fn inc(&self, delta: u64) {
        self.completed.fetch_add(delta, Ordering::SeqCst);
    }

    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// A question site held in memory.
///
/// `pages[i]` holds the links on 1-based page `i + 1`. Failures can be
/// injected per page or per URL and cleared with [`FakeSource::heal`] to
/// simulate a transient outage followed by a resume.
pub struct FakeSource {
    pages: Vec<Vec<String>>,
    failing_pages: Mutex<HashSet<u32>>,
    failing_urls: Mutex<HashSet<String>>,
    page_count_fails: Mutex<bool>,
    page_calls: Mutex<Vec<u32>>,
    question_calls: Mutex<Vec<String>>,
}

impl FakeSource {
    /// Builds a site with `page_sizes.len()` pages; page `p` link `n` is
    /// `https://example.test/q/p-n`.
    pub fn with_pages(page_sizes: &[usize]) -> Self {
        let pages = page_sizes
            .iter()
            .enumerate()
            .map(|(p, &size)| {
                (0..size)
                    .map(|n| format!("https://example.test/q/{}-{n}", p + 1))
                    .collect()
            })
            .collect();
        Self::from_pages(pages)
    }

    pub fn from_pages(pages: Vec<Vec<String>>) -> Self {
        Self {
            pages,
            failing_pages: Mutex::new(HashSet::new()),
            failing_urls: Mutex::new(HashSet::new()),
            page_count_fails: Mutex::new(false),
            page_calls: Mutex::new(Vec::new()),
            question_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_page(&self, page: u32) {
        self.failing_pages.lock().unwrap().insert(page);
    }

    pub fn fail_url(&self, url: &str) {
        self.failing_urls.lock().unwrap().insert(url.to_owned());
    }

    pub fn fail_page_count(&self) {
        *self.page_count_fails.lock().unwrap() = true;
    }

    /// Clears every injected failure and the call logs.
    pub fn heal(&self) {
        self.failing_pages.lock().unwrap().clear();
        self.failing_urls.lock().unwrap().clear();
        *self.page_count_fails.lock().unwrap() = false;
        self.page_calls.lock().unwrap().clear();
        self.question_calls.lock().unwrap().clear();
    }

    pub fn page_calls(&self) -> Vec<u32> {
        let mut calls = self.page_calls.lock().unwrap().clone();
        calls.sort_unstable();
        calls
    }

    pub fn question_calls(&self) -> Vec<String> {
        let mut calls = self.question_calls.lock().unwrap().clone();
        calls.sort();
        calls
    }

    pub fn all_links(&self) -> Vec<String> {
        self.pages.iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl QuestionSource for FakeSource {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn discussion_page_count(
        &self,
        _provider: &str,
        _exam_code: &str,
    ) -> Result<u32, FetchError> {
        if *self.page_count_fails.lock().unwrap() {
            return Err(FetchError::Timeout {
                url: "https://example.test/discussions".to_string(),
            });
        }
        Ok(u32::try_from(self.pages.len()).unwrap())
    }

    async fn fetch_discussion_page(
        &self,
        _provider: &str,
        _exam_code: &str,
        page: u32,
    ) -> Result<Vec<String>, FetchError> {
        self.page_calls.lock().unwrap().push(page);
        if self.failing_pages.lock().unwrap().contains(&page) {
            return Err(FetchError::Status {
                url: format!("https://example.test/discussions/{page}"),
                status: 503,
            });
        }
        Ok(self.pages[usize::try_from(page).unwrap() - 1].clone())
    }

    async fn fetch_question(&self, url: &str) -> Result<Question, FetchError> {
        self.question_calls.lock().unwrap().push(url.to_owned());
        if self.failing_urls.lock().unwrap().contains(url) {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: 429,
            });
        }
        let (topic, index) = url
            .rsplit('/')
            .next()
            .and_then(|tail| tail.split_once('-'))
            .map(|(p, n)| (p.parse::<u32>().unwrap(), n.parse::<u32>().unwrap()))
            .unwrap_or_default();
        Ok(Question {
            topic,
            index,
            body: format!("Body of {url}"),
            ..Question::default()
        })
    }
}
