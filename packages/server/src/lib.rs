#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the exam scraper pipeline.
//!
//! Clients drive a scrape one step at a time: each
//! `POST /api/scraper/continue` takes the previous state snapshot and
//! returns the next one. The server keeps no scrape state of its own apart
//! from the batch settings and the set of runs currently in flight.

mod error;
mod handlers;
pub mod interactive;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use exam_scraper_pipeline::Pipeline;
use exam_scraper_pipeline_models::{ScraperSettings, SettingsError};
use exam_scraper_source::{ExamTopicsConfig, ExamTopicsSource, SourceError};

pub use error::ApiError;

/// Shared application state.
pub struct AppState {
    /// Pipeline bound to the configured question source.
    pub pipeline: Pipeline,
    /// Batch settings used by every continue call.
    pub settings: RwLock<ScraperSettings>,
    in_flight: Mutex<HashSet<(String, String)>>,
}

impl AppState {
    #[must_use]
    pub fn new(pipeline: Pipeline, settings: ScraperSettings) -> Self {
        Self {
            pipeline,
            settings: RwLock::new(settings),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Returns a copy of the current settings.
    pub fn settings(&self) -> ScraperSettings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the current settings.
    pub fn replace_settings(&self, settings: ScraperSettings) {
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Marks a run for `provider`/`exam_code` as started.
    ///
    /// Returns `None` if one is already running. The run is released when
    /// the returned guard is dropped.
    pub fn try_begin(&self, provider: &str, exam_code: &str) -> Option<InFlightRun<'_>> {
        let key = (provider.to_owned(), exam_code.to_lowercase());
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        inserted.then_some(InFlightRun { state: self, key })
    }
}

/// A run registered in [`AppState`]; deregisters itself on drop.
pub struct InFlightRun<'a> {
    state: &'a AppState,
    key: (String, String),
}

impl Drop for InFlightRun<'_> {
    fn drop(&mut self) {
        self.state
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Registers every API route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/providers", web::get().to(handlers::providers))
            .route("/scraper/settings", web::get().to(handlers::get_settings))
            .route("/scraper/settings", web::put().to(handlers::put_settings))
            .route("/scraper/continue", web::post().to(handlers::continue_scrape))
            .route("/scraper/export", web::post().to(handlers::export)),
    );
}

/// Reads `BIND_ADDR` and `PORT`, defaulting to `127.0.0.1:8080`.
#[must_use]
pub fn bind_from_env() -> (String, u16) {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    (bind_addr, port)
}

/// Builds a pipeline over ExamTopics configured from the environment.
///
/// # Errors
///
/// Returns [`SourceError`] if the HTTP client cannot be built.
pub fn pipeline_from_env() -> Result<Pipeline, SourceError> {
    let source = ExamTopicsSource::new(ExamTopicsConfig::from_env())?;
    Ok(Pipeline::new(Arc::new(source)))
}

/// Loads settings from the TOML file named by `EXAM_SCRAPER_SETTINGS`, or
/// the defaults when it is unset.
///
/// # Errors
///
/// Returns [`SettingsError`] if the file cannot be read or is invalid.
pub fn settings_from_env() -> Result<ScraperSettings, SettingsError> {
    let path = std::env::var_os("EXAM_SCRAPER_SETTINGS").map(PathBuf::from);
    ScraperSettings::load_or_default(path.as_deref())
}

/// Starts the API server.
///
/// This is a regular async function; the caller provides the runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(
    pipeline: Pipeline,
    settings: ScraperSettings,
    bind_addr: &str,
    port: u16,
) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(pipeline, settings));

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
