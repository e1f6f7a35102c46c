//! Gemini API client.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use super::completion::GeminiModel;
use crate::config::Settings;
use crate::error::ConfigError;
use crate::providers::HttpClientConfig;

/// Default Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-goog-api-key");

/// Gemini API client for creating completion models.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use tripwire::providers::GeminiClient;
///
/// let client = GeminiClient::builder()
///     .api_key("AIza...")
///     .timeout_secs(30)
///     .build()?;
/// let model = client.completion_model("gemini-2.0-flash");
/// ```
#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: HeaderValue,
    base_url: Arc<str>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new client with the given API key and default base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is blank or the HTTP client
    /// cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::default()
    }

    /// Create a client from loaded [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the key is unusable or the HTTP client
    /// cannot be built.
    pub fn from_settings(settings: &Settings) -> crate::Result<Self> {
        let mut builder = Self::builder()
            .api_key(settings.api_key())
            .timeout_secs(settings.timeout.as_secs());
        if let Some(base_url) = &settings.base_url {
            builder = builder.base_url(base_url);
        }
        Ok(builder.build()?)
    }

    /// Create a completion model with the specified model ID.
    #[must_use]
    pub fn completion_model(&self, model_id: impl Into<String>) -> GeminiModel {
        GeminiModel::new(self.clone(), model_id)
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(super) const fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub(super) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl GeminiClientBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom base URL (proxies, regional endpoints, test servers).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the transport-level request timeout in seconds.
    ///
    /// The pipeline applies its own per-call deadline on top of this.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no API key was set,
    /// [`ConfigError::Invalid`] if the key cannot travel in a header, and
    /// [`ConfigError::HttpClient`] if the HTTP client fails to build.
    pub fn build(self) -> Result<GeminiClient, ConfigError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::missing("api_key"))?;
        let mut api_key = HeaderValue::from_str(&api_key).map_err(|_| {
            ConfigError::invalid("api_key", "contains characters not allowed in an HTTP header")
        })?;
        api_key.set_sensitive(true);
        let base_url = self
            .base_url
            .unwrap_or_else(|| GEMINI_API_BASE_URL.to_string());
        let http_client = HttpClientConfig {
            timeout_secs: self.timeout_secs,
            user_agent: Some(concat!("tripwire/", env!("CARGO_PKG_VERSION")).to_string()),
        }
        .build_client()?;

        Ok(GeminiClient {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').into(),
        })
    }
}
