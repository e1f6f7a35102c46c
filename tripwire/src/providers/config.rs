//! HTTP client configuration shared by network-backed providers.

use crate::error::ConfigError;

/// Shared HTTP client configuration.
#[derive(Debug, Clone, Default)]
pub struct HttpClientConfig {
    /// Transport-level request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// User agent string.
    pub user_agent: Option<String>,
}

impl HttpClientConfig {
    /// Build a reqwest client with this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend or resolver
    /// cannot be initialised.
    pub fn build_client(&self) -> Result<reqwest::Client, ConfigError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }
}
