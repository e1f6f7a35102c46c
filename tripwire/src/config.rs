//! Startup configuration.
//!
//! Settings are read once, validated eagerly, and then shared read-only.
//! A missing credential or model identifier fails here, before any network
//! call is attempted.

use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the model identifier.
pub const MODEL_VAR: &str = "GEMINI_MODEL_NAME";
/// Optional environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
/// Optional environment variable setting the per-call timeout in seconds.
pub const TIMEOUT_VAR: &str = "TRIPWIRE_TIMEOUT_SECS";

/// Per-call timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Validated process configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    api_key: String,
    /// Model identifier, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// Base URL override for the completion service.
    pub base_url: Option<String>,
    /// Deadline applied to every classifier and agent call.
    pub timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    /// Create settings from explicit values with the default timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) wrapping
    /// [`ConfigError::Missing`] if the key or model is unset or blank, or
    /// [`ConfigError::Invalid`] if the timeout is not a positive integer.
    pub fn from_env() -> crate::Result<Self> {
        Ok(Self::from_lookup(|var| std::env::var(var).ok())?)
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] that [`Settings::from_env`] would wrap.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = non_blank(API_KEY_VAR).ok_or_else(|| ConfigError::missing(API_KEY_VAR))?;
        let model = non_blank(MODEL_VAR).ok_or_else(|| ConfigError::missing(MODEL_VAR))?;
        let base_url = non_blank(BASE_URL_VAR);
        let timeout = match non_blank(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout,
        })
    }

    /// Override the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API credential.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(TIMEOUT_VAR, "must be greater than zero")),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::invalid(TIMEOUT_VAR, e.to_string())),
    }
}
