#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line driver for the exam scraper.
//!
//! Each `scrape` invocation advances a scrape by one step (or loops with
//! `--until-complete`) and writes the returned state to a JSON state file,
//! so an interrupted run resumes where it stopped. Without a subcommand the
//! CLI falls back to an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`exam_scraper_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod interactive;
mod scrape;
mod state_file;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use exam_scraper_cli_utils::{IndicatifProgress, MultiProgress};
use exam_scraper_pipeline::Pipeline;
use exam_scraper_pipeline::export::{export_questions, import_state};
use exam_scraper_pipeline_models::{ScraperSettings, ScraperState};
use exam_scraper_source::providers::PROVIDERS;
use exam_scraper_source::{ExamTopicsConfig, ExamTopicsSource, SourceError};

use crate::scrape::StepOptions;

#[derive(Parser)]
#[command(name = "exam_scraper_cli", about = "Resumable exam question scraper")]
struct Cli {
    /// TOML settings file (overrides `EXAM_SCRAPER_SETTINGS`)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Site root (overrides `EXAM_SCRAPER_BASE_URL`)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Per-request timeout in seconds (overrides `EXAM_SCRAPER_TIMEOUT_SECS`)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Retries per request (overrides `EXAM_SCRAPER_MAX_RETRIES`); 0 disables
    #[arg(long, global = true)]
    max_retries: Option<u32>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the next scrape step for an exam, resuming from its state file
    Scrape {
        /// Provider id (e.g., "amazon")
        provider: String,
        /// Exam code (e.g., "saa-c03")
        exam_code: String,
        /// State file (default: `{provider}-{examCode}.state.json`)
        #[arg(long)]
        state: Option<PathBuf>,
        /// Keep stepping until every question is fetched
        #[arg(long)]
        until_complete: bool,
        /// Maximum number of steps with `--until-complete`
        #[arg(long)]
        max_steps: Option<u32>,
        /// Pause before resuming an interrupted step, in milliseconds
        #[arg(long, default_value = "5000")]
        retry_delay_ms: u64,
    },
    /// Write the questions of a complete state file as JSON
    Export {
        /// State file to export
        state: PathBuf,
        /// Directory to write `{provider}-{examCode}-{count}.json` into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Create a state file from an exported question array or a state snapshot
    Import {
        /// File to import
        file: PathBuf,
        /// Provider id for a bare question array
        #[arg(long, default_value = "")]
        provider: String,
        /// Exam code for a bare question array
        #[arg(long, default_value = "")]
        exam_code: String,
        /// State file to write (default: `{provider}-{examCode}.state.json`)
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Print the effective batch settings
    Settings,
    /// List known providers
    Providers,
    /// Start the HTTP API server
    Serve {
        /// Bind address (overrides `BIND_ADDR`)
        #[arg(long)]
        bind_addr: Option<String>,
        /// Port (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Settings and source configuration shared by every command.
pub struct Context {
    pub multi: MultiProgress,
    pub settings: ScraperSettings,
    pub source: ExamTopicsConfig,
}

impl Context {
    /// Builds a pipeline whose progress is drawn as a bar labelled `message`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the HTTP client cannot be built.
    pub fn pipeline(&self, message: &str) -> Result<Pipeline, SourceError> {
        let source = ExamTopicsSource::new(self.source.clone())?;
        Ok(Pipeline::new(Arc::new(source))
            .with_progress(IndicatifProgress::step_bar(&self.multi, message)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = exam_scraper_cli_utils::init_logger();
    let cli = Cli::parse();

    let settings_path = cli
        .settings
        .or_else(|| std::env::var_os("EXAM_SCRAPER_SETTINGS").map(PathBuf::from));
    let settings = ScraperSettings::load_or_default(settings_path.as_deref())?;

    let mut source = ExamTopicsConfig::from_env();
    if let Some(base_url) = cli.base_url {
        source.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = cli.timeout_secs {
        source.timeout = Duration::from_secs(secs);
    }
    if let Some(retries) = cli.max_retries {
        source.max_retries = retries;
    }

    let ctx = Context {
        multi,
        settings,
        source,
    };

    let Some(command) = cli.command else {
        return interactive::run(&ctx).await;
    };

    match command {
        Commands::Scrape {
            provider,
            exam_code,
            state,
            until_complete,
            max_steps,
            retry_delay_ms,
        } => {
            let path = state.unwrap_or_else(|| state_file::default_path(&provider, &exam_code));
            let options = StepOptions {
                until_complete,
                max_steps,
                retry_delay: Duration::from_millis(retry_delay_ms),
            };
            scrape(&ctx, &provider, &exam_code, &path, options).await?;
        }
        Commands::Export { state, out_dir } => {
            export(&state, &out_dir)?;
        }
        Commands::Import {
            file,
            provider,
            exam_code,
            state,
        } => {
            import(&file, &provider, &exam_code, state.as_deref())?;
        }
        Commands::Settings => {
            println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
        }
        Commands::Providers => {
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(40));
            for provider in PROVIDERS {
                println!("{:<20} {}", provider.id, provider.label);
            }
        }
        Commands::Serve { bind_addr, port } => {
            let (env_addr, env_port) = exam_scraper_server::bind_from_env();
            serve(
                &ctx,
                bind_addr.unwrap_or(env_addr),
                port.unwrap_or(env_port),
            )
            .await?;
        }
    }

    Ok(())
}

/// Runs scrape steps for one exam against its state file.
async fn scrape(
    ctx: &Context,
    provider: &str,
    exam_code: &str,
    path: &Path,
    options: StepOptions,
) -> Result<ScraperState, Box<dyn std::error::Error>> {
    if exam_scraper_source::providers::find(provider).is_none() {
        log::warn!("{provider} is not a known provider; trying it anyway");
    }

    let state = state_file::load_or_new(path, provider, exam_code)?;
    let state = if state.belongs_to(provider, exam_code) {
        state
    } else {
        log::warn!(
            "{} holds {}/{}; starting {provider}/{exam_code} fresh",
            path.display(),
            state.provider,
            state.exam_code,
        );
        ScraperState::new(provider, exam_code)
    };

    let pipeline = ctx.pipeline(&format!("{provider}/{exam_code}"))?;
    let state = scrape::run_steps(&pipeline, state, &ctx.settings, options, |s| {
        state_file::save(path, s)
    })
    .await?;

    println!(
        "{provider}/{exam_code}: {} ({} links, {} questions) -> {}",
        state.phase().label(),
        state.question_links.len(),
        state.questions.len(),
        path.display(),
    );

    Ok(state)
}

/// Writes the questions of a complete state file into `out_dir`.
fn export(state: &Path, out_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let state = state_file::load(state)?;
    let export = export_questions(&state)?;

    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&export.file_name);
    std::fs::write(&path, &export.contents)?;

    println!(
        "Exported {} questions to {}",
        state.questions.len(),
        path.display()
    );
    Ok(path)
}

/// Turns an exported file into a state file.
fn import(
    file: &Path,
    provider: &str,
    exam_code: &str,
    state_path: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let contents = std::fs::read(file)?;
    let state = import_state(&contents, provider, exam_code)?;

    if state.provider.is_empty() || state.exam_code.is_empty() {
        return Err("imported question arrays need --provider and --exam-code".into());
    }

    let path = state_path.map_or_else(
        || state_file::default_path(&state.provider, &state.exam_code),
        Path::to_path_buf,
    );
    state_file::save(&path, &state)?;

    println!(
        "Imported {}/{} ({}) into {}",
        state.provider,
        state.exam_code,
        state.phase().label(),
        path.display()
    );
    Ok(path)
}

/// Runs the API server on actix's own runtime.
async fn serve(
    ctx: &Context,
    bind_addr: String,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = ExamTopicsSource::new(ctx.source.clone())?;
    let pipeline = Pipeline::new(Arc::new(source));
    let settings = ctx.settings;

    // actix-web needs its own runtime; running it in a blocking task
    // avoids nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(exam_scraper_server::run_server(
            pipeline, settings, &bind_addr, port,
        ))
    })
    .await??;

    Ok(())
}

#[cfg(test)]
mod tests {
    use exam_scraper_pipeline_models::{PipelinePhase, Question};

    use super::*;

    #[test]
    fn export_then_import_restores_complete_state() {
        let dir = std::env::temp_dir().join("exam_scraper_cli_export_import");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let state = ScraperState {
            question_links: vec!["https://example.test/q/1".to_string()],
            questions: vec![Question {
                body: "Which service stores objects?".to_string(),
                ..Question::shell("https://example.test/q/1")
            }],
            ..ScraperState::new("amazon", "saa-c03")
        };
        let state_path = dir.join("amazon-saa-c03.state.json");
        state_file::save(&state_path, &state).unwrap();

        let exported = export(&state_path, &dir).unwrap();
        assert_eq!(exported, dir.join("amazon-saa-c03-1.json"));

        let restored_path = dir.join("restored.state.json");
        import(&exported, "amazon", "saa-c03", Some(restored_path.as_path())).unwrap();
        let restored = state_file::load(&restored_path).unwrap();

        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(restored.phase(), PipelinePhase::Complete);
        assert_eq!(restored.questions, state.questions);
    }

    #[test]
    fn export_refuses_incomplete_state_file() {
        let dir = std::env::temp_dir().join("exam_scraper_cli_export_incomplete");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let state_path = dir.join("partial.state.json");
        state_file::save(
            &state_path,
            &ScraperState {
                last_discussion_list_page_index: Some(2),
                ..ScraperState::new("amazon", "saa-c03")
            },
        )
        .unwrap();

        let result = export(&state_path, &dir);
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn bare_array_import_needs_exam() {
        let dir = std::env::temp_dir().join("exam_scraper_cli_import_bare");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let file = dir.join("questions.json");
        std::fs::write(&file, br#"[{"url": "https://example.test/q/1"}]"#).unwrap();

        let out = dir.join("out.state.json");
        let result = import(&file, "", "", Some(out.as_path()));
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(result.is_err());
    }
}
