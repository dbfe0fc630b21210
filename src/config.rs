//! Session configuration.
//!
//! Durations are stored as integer milliseconds so the struct round-trips
//! through JSON unchanged; accessors hand out [`Duration`]s.
//!
//! ```rust
//! use proofline::Config;
//!
//! let config = Config::from_json(r#"{ "debounce_ms": 500, "locale": "en-GB" }"#).unwrap();
//! assert_eq!(config.debounce().as_millis(), 500);
//! assert_eq!(config.locale, "en-GB");
//! assert!(config.highlight);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings consumed by a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Quiet period after the last edit before analysis runs.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Locale tag passed through to the grammar engine.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Upper bound on one grammar engine call.
    #[serde(default = "default_analysis_timeout_ms")]
    pub analysis_timeout_ms: u64,

    /// Run the advisory spelling overlay.
    #[serde(default = "default_true")]
    pub highlight: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            locale: default_locale(),
            analysis_timeout_ms: default_analysis_timeout_ms(),
            highlight: default_true(),
        }
    }
}

impl Config {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed JSON and
    /// [`Error::InvalidConfig`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a zero debounce or timeout, or an
    /// empty locale.
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(Error::InvalidConfig("debounce_ms must be > 0".into()));
        }
        if self.analysis_timeout_ms == 0 {
            return Err(Error::InvalidConfig("analysis_timeout_ms must be > 0".into()));
        }
        if self.locale.trim().is_empty() {
            return Err(Error::InvalidConfig("locale must not be empty".into()));
        }
        Ok(())
    }

    /// Set the debounce delay.
    #[must_use]
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Set the locale tag.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the grammar engine timeout.
    #[must_use]
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Enable or disable the advisory overlay.
    #[must_use]
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Debounce delay as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Grammar engine timeout as a [`Duration`].
    #[must_use]
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_analysis_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}
