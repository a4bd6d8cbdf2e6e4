//! Rate-limit settings for the two pipeline stages.
//!
//! Settings are owned by the caller (a TOML file for the CLI, the admin
//! endpoint for the server) and passed explicitly into each pipeline call.
//!
//! ```toml
//! [questionLinks]
//! batchSize = 5
//! sleepDuration = 1000
//!
//! [questions]
//! batchSize = 5
//! sleepDuration = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default number of concurrent fetches per batch.
pub const DEFAULT_BATCH_SIZE: u32 = 5;

/// Default pause between batches, in milliseconds.
pub const DEFAULT_SLEEP_DURATION_MS: u64 = 1000;

/// Errors that can occur while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid TOML or has the wrong shape.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The settings parsed but hold values the pipeline cannot use.
    #[error("Invalid settings: {message}")]
    Invalid {
        /// Description of the offending value.
        message: String,
    },
}

/// Batch size and inter-batch sleep for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSettings {
    /// Fetches dispatched together. Must be positive.
    pub batch_size: u32,
    /// Pause after each batch except the last, in milliseconds.
    pub sleep_duration: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            sleep_duration: DEFAULT_SLEEP_DURATION_MS,
        }
    }
}

impl BatchSettings {
    /// Settings dispatching `batch_size` items at a time, pausing
    /// `sleep_duration` milliseconds between batches.
    #[must_use]
    pub const fn new(batch_size: u32, sleep_duration: u64) -> Self {
        Self {
            batch_size,
            sleep_duration,
        }
    }

    /// The inter-batch pause as a [`Duration`].
    #[must_use]
    pub const fn sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_duration)
    }

    /// Checks that the batch size is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] if `batch_size` is zero.
    pub fn validate(&self, stage: &str) -> Result<(), SettingsError> {
        if self.batch_size == 0 {
            return Err(SettingsError::Invalid {
                message: format!("{stage}.batchSize must be greater than zero"),
            });
        }
        Ok(())
    }
}

/// Settings for both pipeline stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScraperSettings {
    /// Link discovery over discussion-list pages.
    #[serde(default)]
    pub question_links: BatchSettings,
    /// Question page fetching.
    #[serde(default)]
    pub questions: BatchSettings,
}

impl ScraperSettings {
    /// Checks both stages.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.question_links.validate("questionLinks")?;
        self.questions.validate("questions")
    }

    /// Parses and validates settings from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the document does not parse or holds
    /// invalid values.
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses, and validates a TOML settings file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file cannot be read, does not parse,
    /// or holds invalid values.
    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Loads settings from `path` when given, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if a given file cannot be loaded.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        path.map_or_else(|| Ok(Self::default()), Self::from_toml_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = ScraperSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.questions.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(
            settings.question_links.sleep(),
            Duration::from_millis(DEFAULT_SLEEP_DURATION_MS)
        );
    }

    #[test]
    fn parses_toml_tables() {
        let settings = ScraperSettings::from_toml_str(
            r"
            [questionLinks]
            batchSize = 3
            sleepDuration = 250

            [questions]
            batchSize = 8
            sleepDuration = 0
            ",
        )
        .unwrap();
        assert_eq!(settings.question_links, BatchSettings::new(3, 250));
        assert_eq!(settings.questions, BatchSettings::new(8, 0));
    }

    #[test]
    fn missing_table_falls_back_to_default() {
        let settings = ScraperSettings::from_toml_str(
            r"
            [questions]
            batchSize = 2
            sleepDuration = 10
            ",
        )
        .unwrap();
        assert_eq!(settings.question_links, BatchSettings::default());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = ScraperSettings::from_toml_str(
            r"
            [questionLinks]
            batchSize = 0
            sleepDuration = 10
            ",
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
        assert!(err.to_string().contains("questionLinks.batchSize"));
    }

    #[test]
    fn rejects_negative_values_at_parse_time() {
        let err = ScraperSettings::from_toml_str(
            r"
            [questions]
            batchSize = -1
            sleepDuration = 10
            ",
        )
        .unwrap_err();
        assert!(matches!(err, SettingsError::Toml(_)));
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_value(ScraperSettings::default()).unwrap();
        assert_eq!(json["questionLinks"]["batchSize"], 5);
        assert_eq!(json["questions"]["sleepDuration"], 1000);
    }
}
