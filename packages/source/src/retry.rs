//! HTTP retry helpers for transient errors.
//!
//! Every page fetch goes through [`send_text`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so connection failures,
//! timeouts, rate limiting and server errors are retried with exponential
//! backoff (2s, 4s, 8s, ...). The pipeline never retries on its own; a
//! fetch that still fails here becomes the resumable checkpoint.

use std::time::Duration;

use exam_scraper_pipeline::FetchError;

/// Sends a GET-style request and returns the body as text.
///
/// `build_request` is called once per attempt because builders are
/// consumed by `.send()`. At most `max_retries` retries follow the first
/// attempt; 4xx responses other than 429 are never retried.
///
/// # Errors
///
/// Returns [`FetchError`] if the request still fails after all retries or
/// the server answers with a non-retryable status.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(
    url: &str,
    max_retries: u32,
    build_request: F,
) -> Result<String, FetchError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{max_retries} for {url} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        let error = match build_request().send().await {
            Err(e) => {
                let transient = is_transient(&e);
                let error = request_error(url, &e);
                if !transient {
                    return Err(error);
                }
                log::warn!("  transient error: {e}");
                error
            }
            Ok(response) => {
                let status = response.status();
                if is_retryable_status(status) {
                    log::warn!("  HTTP {status} from {url}");
                    FetchError::Status {
                        url: url.to_owned(),
                        status: status.as_u16(),
                    }
                } else if status.is_client_error() || status.is_server_error() {
                    return Err(FetchError::Status {
                        url: url.to_owned(),
                        status: status.as_u16(),
                    });
                } else {
                    return response.text().await.map_err(|e| request_error(url, &e));
                }
            }
        };

        if attempt >= max_retries {
            if max_retries > 0 {
                log::error!("Giving up on {url} after {max_retries} retries: {error}");
            }
            return Err(error);
        }
        attempt += 1;
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}

/// 429 and 5xx are worth another attempt.
fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

fn request_error(url: &str, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_owned(),
        }
    } else {
        FetchError::Request {
            url: url.to_owned(),
            message: e.to_string(),
        }
    }
}
