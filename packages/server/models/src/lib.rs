#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the exam scraper server.
//!
//! Scraper state and settings travel in their pipeline shapes; only the
//! envelopes around them live here.

use exam_scraper_pipeline_models::ScraperState;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A provider that can be scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProvider {
    /// Provider id used in requests.
    pub id: String,
    /// Display name.
    pub label: String,
}

/// Body of `POST /api/scraper/continue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequest {
    pub provider: String,
    pub exam_code: String,
    /// Snapshot returned by the previous call; omitted to start fresh.
    #[serde(default)]
    pub state: Option<ScraperState>,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
