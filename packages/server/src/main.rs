#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary for the exam scraper API server.

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let pipeline = exam_scraper_server::pipeline_from_env()?;
    let settings = exam_scraper_server::settings_from_env()?;
    log::info!("Scraper settings: {settings:?}");

    let (bind_addr, port) = exam_scraper_server::bind_from_env();
    exam_scraper_server::run_server(pipeline, settings, &bind_addr, port).await?;

    Ok(())
}
