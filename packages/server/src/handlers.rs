//! HTTP handler functions for the exam scraper API.

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use exam_scraper_pipeline::export::export_questions;
use exam_scraper_pipeline_models::{ScraperSettings, ScraperState};
use exam_scraper_server_models::{ApiHealth, ApiProvider, ContinueRequest};
use exam_scraper_source::providers::PROVIDERS;

use crate::{ApiError, AppState};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/providers`
pub async fn providers() -> HttpResponse {
    let providers: Vec<ApiProvider> = PROVIDERS
        .iter()
        .map(|p| ApiProvider {
            id: p.id.to_string(),
            label: p.label.to_string(),
        })
        .collect();

    HttpResponse::Ok().json(providers)
}

/// `GET /api/scraper/settings`
pub async fn get_settings(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.settings())
}

/// `PUT /api/scraper/settings`
///
/// Validates and replaces the in-memory settings.
pub async fn put_settings(
    state: web::Data<AppState>,
    body: web::Json<ScraperSettings>,
) -> Result<HttpResponse, ApiError> {
    let settings = body.into_inner();
    settings.validate()?;
    state.replace_settings(settings);
    log::info!("Scraper settings updated: {settings:?}");
    Ok(HttpResponse::Ok().json(settings))
}

/// `POST /api/scraper/continue`
///
/// Performs the next step of a scrape and returns the new state.
#[allow(clippy::future_not_send)]
pub async fn continue_scrape(
    state: web::Data<AppState>,
    body: web::Json<ContinueRequest>,
) -> Result<HttpResponse, ApiError> {
    let ContinueRequest {
        provider,
        exam_code,
        state: snapshot,
    } = body.into_inner();

    let Some(_run) = state.try_begin(&provider, &exam_code) else {
        return Err(ApiError::Conflict {
            provider,
            exam_code,
        });
    };

    let snapshot = snapshot.unwrap_or_else(|| ScraperState::new(&provider, &exam_code));
    let settings = state.settings();

    let next = state
        .pipeline
        .continue_scrape(&provider, &exam_code, &snapshot, &settings)
        .await?;

    Ok(HttpResponse::Ok().json(next))
}

/// `POST /api/scraper/export`
///
/// Returns the questions of a complete state as a JSON download.
pub async fn export(body: web::Json<ScraperState>) -> Result<HttpResponse, ApiError> {
    let export = export_questions(&body)?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(export.file_name)],
            },
        ))
        .body(export.contents))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use exam_scraper_pipeline_models::{PipelinePhase, Question};
    use serde_json::json;

    use crate::configure;
    use crate::testing::app_state;

    #[actix_web::test]
    async fn health_reports_version() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn lists_providers() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/providers").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["id"], "amazon");
    }

    #[actix_web::test]
    async fn settings_round_trip_and_validation() {
        let app =
            test::init_service(App::new().app_data(app_state(false)).configure(configure)).await;

        let req = test::TestRequest::put()
            .uri("/api/scraper/settings")
            .set_json(json!({
                "questionLinks": {"batchSize": 3, "sleepDuration": 250},
                "questions": {"batchSize": 10, "sleepDuration": 0}
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/scraper/settings")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["questionLinks"]["batchSize"], 3);
        assert_eq!(body["questions"]["batchSize"], 10);

        let req = test::TestRequest::put()
            .uri("/api/scraper/settings")
            .set_json(json!({
                "questionLinks": {"batchSize": 0, "sleepDuration": 0},
                "questions": {"batchSize": 1, "sleepDuration": 0}
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn continue_runs_to_completion() {
        let app =
            test::init_service(App::new().app_data(app_state(false)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/scraper/continue")
            .set_json(json!({"provider": "amazon", "examCode": "saa-c03"}))
            .to_request();
        let state: exam_scraper_pipeline_models::ScraperState =
            test::call_and_read_body_json(&app, req).await;

        assert_eq!(state.phase(), PipelinePhase::Complete);
        assert_eq!(state.question_links.len(), 4);
        assert_eq!(state.questions[3].url, "https://example.test/q/2-2");
    }

    #[actix_web::test]
    async fn continue_returns_checkpoint_on_failure() {
        let app =
            test::init_service(App::new().app_data(app_state(true)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/scraper/continue")
            .set_json(json!({"provider": "amazon", "examCode": "saa-c03"}))
            .to_request();
        let state: exam_scraper_pipeline_models::ScraperState =
            test::call_and_read_body_json(&app, req).await;

        assert_eq!(state.phase(), PipelinePhase::LinksPartial);
        assert_eq!(state.last_discussion_list_page_index, Some(2));
        assert_eq!(state.question_links.len(), 2);
        assert!(state.questions.is_empty());
    }

    #[actix_web::test]
    async fn continue_rejects_empty_exam_code() {
        let app =
            test::init_service(App::new().app_data(app_state(false)).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/scraper/continue")
            .set_json(json!({"provider": "amazon", "examCode": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn export_sets_attachment_file_name() {
        let app = test::init_service(App::new().configure(configure)).await;
        let state = exam_scraper_pipeline_models::ScraperState {
            question_links: vec!["https://example.test/q/1-1".to_string()],
            questions: vec![Question::shell("https://example.test/q/1-1")],
            ..exam_scraper_pipeline_models::ScraperState::new("amazon", "saa-c03")
        };

        let req = test::TestRequest::post()
            .uri("/api/scraper/export")
            .set_json(&state)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get(actix_web::http::header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("amazon-saa-c03-1.json"));

        let body: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body[0]["url"], "https://example.test/q/1-1");
    }

    #[actix_web::test]
    async fn export_rejects_incomplete_state() {
        let app = test::init_service(App::new().configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/api/scraper/export")
            .set_json(json!({"provider": "amazon", "examCode": "saa-c03"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
