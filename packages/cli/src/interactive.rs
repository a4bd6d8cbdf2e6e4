//! Interactive mode, used when no subcommand is given.

use std::path::PathBuf;
use std::time::Duration;

use dialoguer::{Confirm, Input, Select};
use exam_scraper_source::providers::PROVIDERS;

use crate::Context;
use crate::scrape::StepOptions;
use crate::state_file;

/// Top-level actions offered by the menu.
enum Tool {
    Scrape,
    Export,
    Import,
    Settings,
    Serve,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Scrape,
        Self::Export,
        Self::Import,
        Self::Settings,
        Self::Serve,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Scrape => "Scrape or resume an exam",
            Self::Export => "Export a completed exam",
            Self::Import => "Import questions or a state file",
            Self::Settings => "Show batch settings",
            Self::Serve => "Start server",
        }
    }
}

/// Prompts for a provider from the catalogue.
fn select_provider() -> Result<&'static str, dialoguer::Error> {
    let labels: Vec<String> = PROVIDERS
        .iter()
        .map(|p| format!("{} ({})", p.label, p.id))
        .collect();

    let idx = Select::new()
        .with_prompt("Provider")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(PROVIDERS[idx].id)
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the chosen action fails.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    println!("Exam Scraper");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Scrape => {
            let provider = select_provider()?;
            let exam_code: String = Input::new()
                .with_prompt("Exam code")
                .interact_text()?;
            let exam_code = exam_code.trim().to_string();

            let path: String = Input::new()
                .with_prompt("State file")
                .default(
                    state_file::default_path(provider, &exam_code)
                        .display()
                        .to_string(),
                )
                .interact_text()?;

            let until_complete = Confirm::new()
                .with_prompt("Keep going until every question is fetched?")
                .default(true)
                .interact()?;

            let options = StepOptions {
                until_complete,
                max_steps: None,
                retry_delay: Duration::from_secs(5),
            };
            crate::scrape(ctx, provider, &exam_code, &PathBuf::from(path), options).await?;
        }
        Tool::Export => {
            let state: String = Input::new().with_prompt("State file").interact_text()?;
            let out_dir: String = Input::new()
                .with_prompt("Output directory")
                .default(".".to_string())
                .interact_text()?;
            crate::export(&PathBuf::from(state), &PathBuf::from(out_dir))?;
        }
        Tool::Import => {
            let file: String = Input::new()
                .with_prompt("File to import")
                .interact_text()?;
            let provider = select_provider()?;
            let exam_code: String = Input::new()
                .with_prompt("Exam code")
                .interact_text()?;
            crate::import(&PathBuf::from(file), provider, exam_code.trim(), None)?;
        }
        Tool::Settings => {
            println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
        }
        Tool::Serve => {
            // The server uses actix-web's runtime, so we need to run it
            // in a blocking task to avoid nesting tokio runtimes.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new()
                    .block_on(exam_scraper_server::interactive::run())
                    .map_err(|e| e.to_string())
            })
            .await??;
        }
    }

    Ok(())
}
