//! Reading and writing scraper state snapshots on disk.

use std::path::{Path, PathBuf};

use exam_scraper_pipeline_models::ScraperState;

/// Errors that can occur while reading or writing a state file.
#[derive(Debug, thiserror::Error)]
pub enum StateFileError {
    /// I/O error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not a valid state snapshot.
    #[error("Invalid state file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// State file used when none is given: `{provider}-{examCode}.state.json`.
#[must_use]
pub fn default_path(provider: &str, exam_code: &str) -> PathBuf {
    PathBuf::from(format!("{provider}-{exam_code}.state.json"))
}

/// Loads a snapshot, or a fresh state for `provider`/`exam_code` if the file
/// does not exist yet.
///
/// # Errors
///
/// Returns [`StateFileError`] if the file exists but cannot be read or
/// parsed.
pub fn load_or_new(
    path: &Path,
    provider: &str,
    exam_code: &str,
) -> Result<ScraperState, StateFileError> {
    if !path.exists() {
        log::info!("No state at {}, starting fresh", path.display());
        return Ok(ScraperState::new(provider, exam_code));
    }
    load(path)
}

/// Loads an existing snapshot.
///
/// # Errors
///
/// Returns [`StateFileError`] if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<ScraperState, StateFileError> {
    let contents = std::fs::read(path).map_err(|source| StateFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&contents).map_err(|source| StateFileError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a snapshot, replacing the previous one atomically.
///
/// # Errors
///
/// Returns [`StateFileError`] if the file cannot be written.
pub fn save(path: &Path, state: &ScraperState) -> Result<(), StateFileError> {
    let io_err = |source: std::io::Error| StateFileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let contents = serde_json::to_vec_pretty(state).map_err(|source| StateFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;

    log::debug!("Saved state to {}", path.display());
    Ok(())
}
