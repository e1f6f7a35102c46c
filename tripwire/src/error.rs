//! Unified error types for the tripwire pipeline.
//!
//! Two failure families exist:
//! - [`UpstreamError`]: the completion service or agent runtime failed,
//!   timed out, or returned nothing usable.
//! - [`ConfigError`]: invalid or missing startup configuration.
//!
//! Gate vetoes are not errors. They surface as
//! [`PipelineResult::InputBlocked`](crate::agent::PipelineResult) and
//! [`PipelineResult::OutputBlocked`](crate::agent::PipelineResult).

use std::fmt;

/// Result type alias for tripwire operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the tripwire crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// External completion service or agent runtime failure.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Startup configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Error raised by a call to the external completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct UpstreamError {
    /// The error kind.
    pub kind: UpstreamErrorKind,
    /// The provider name (e.g., "gemini", "mock").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum UpstreamErrorKind {
    /// The call did not complete within the configured deadline.
    Timeout,
    /// Network or connection error.
    Network,
    /// Non-success HTTP status.
    HttpStatus,
    /// The service answered without any text.
    EmptyResponse,
    /// The response body could not be understood.
    ResponseFormat,
    /// Provider-specific error.
    Provider,
}

impl UpstreamError {
    const fn with_kind(kind: UpstreamErrorKind, message: String) -> Self {
        Self {
            kind,
            provider: None,
            message,
            code: None,
        }
    }

    /// Create a timeout error for a call that exceeded `after`.
    #[must_use]
    pub fn timeout(after: std::time::Duration) -> Self {
        Self::with_kind(
            UpstreamErrorKind::Timeout,
            format!("Request timed out after {}ms", after.as_millis()),
        )
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::with_kind(UpstreamErrorKind::Network, message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let mut err = Self::with_kind(
            UpstreamErrorKind::HttpStatus,
            format!("HTTP {status}: {}", body.into()),
        );
        err.code = Some(status.to_string());
        err
    }

    /// Create an error for a response that carried no text.
    #[must_use]
    pub fn empty_response() -> Self {
        Self::with_kind(
            UpstreamErrorKind::EmptyResponse,
            "Completion service returned no text".into(),
        )
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(message: impl Into<String>) -> Self {
        Self::with_kind(UpstreamErrorKind::ResponseFormat, message.into())
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(UpstreamErrorKind::Provider, message.into()).with_provider(provider)
    }

    /// Attach the provider name.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Returns `true` if this error was caused by a deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self.kind, UpstreamErrorKind::Timeout)
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::with_kind(UpstreamErrorKind::Timeout, "Request timed out".into())
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else if err.is_decode() {
            Self::response_format(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for invalid startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required environment variable is unset or blank.
    #[error("missing required setting '{var}'")]
    Missing {
        /// Name of the variable.
        var: String,
    },

    /// A setting is present but cannot be used.
    #[error("invalid value for '{var}': {reason}")]
    Invalid {
        /// Name of the variable.
        var: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A gate prompt template lacks the `{input}` placeholder.
    #[error("gate '{gate}' prompt template has no {{input}} placeholder")]
    InvalidTemplate {
        /// Name of the gate.
        gate: String,
    },

    /// Two agent profiles were registered under one name.
    #[error("agent profile '{name}' is already registered")]
    DuplicateProfile {
        /// The conflicting profile name.
        name: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigError {
    /// Create a missing-setting error.
    #[must_use]
    pub fn missing(var: impl Into<String>) -> Self {
        Self::Missing { var: var.into() }
    }

    /// Create an invalid-setting error.
    #[must_use]
    pub fn invalid(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
