//! Mapping of pipeline failures onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use exam_scraper_pipeline::ScrapeError;
use exam_scraper_pipeline::export::ExportError;
use exam_scraper_pipeline_models::SettingsError;
use exam_scraper_server_models::ApiErrorBody;

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// Another continue call for the same exam has not finished yet.
    #[error("A scrape for {provider}/{exam_code} is already running")]
    Conflict { provider: String, exam_code: String },
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Scrape(ScrapeError::Config { .. })
            | Self::Settings(_)
            | Self::Export(ExportError::Incomplete { .. }) => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Scrape(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        HttpResponse::build(status).json(ApiErrorBody {
            error: self.to_string(),
        })
    }
}
