//! Interactive mode for the server.
//!
//! Prompts for bind address, port and settings file before starting the
//! server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use exam_scraper_pipeline_models::ScraperSettings;

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults come from `BIND_ADDR`, `PORT` and `EXAM_SCRAPER_SETTINGS`.
///
/// # Errors
///
/// Returns an error if the settings file is invalid, the source cannot be
/// built, or the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Exam Scraper Server");
    println!();

    let (default_addr, default_port) = super::bind_from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(default_addr.clone())
        .interact_text()
        .unwrap_or(default_addr);

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(default_port)
        .interact_text()
        .unwrap_or(default_port);

    let settings_path: String = Input::new()
        .with_prompt("Settings file (empty for defaults)")
        .default(std::env::var("EXAM_SCRAPER_SETTINGS").unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();

    let settings = if settings_path.trim().is_empty() {
        ScraperSettings::default()
    } else {
        ScraperSettings::from_toml_file(&PathBuf::from(settings_path.trim()))?
    };

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let pipeline = super::pipeline_from_env()?;
    super::run_server(pipeline, settings, &bind_addr, port).await?;

    Ok(())
}
