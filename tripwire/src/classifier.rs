//! Classifier call: one prompt in, raw classifier text out.
//!
//! A [`Classifier`] performs no retries and no caching. Whether a failure is
//! fatal is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::DEFAULT_TIMEOUT;
use crate::error::UpstreamError;
use crate::providers::{CompletionModel, CompletionRequest, ModelResponse};

/// Sends a classification prompt to an external service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `prompt` and return the service's raw text.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] when the call fails, times out, or
    /// returns no text.
    async fn classify(&self, prompt: &str) -> Result<String, UpstreamError>;
}

/// [`Classifier`] backed by a [`CompletionModel`] with a per-call deadline.
#[derive(Debug, Clone)]
pub struct ModelClassifier<M> {
    model: M,
    timeout: Duration,
}

impl<M: CompletionModel> ModelClassifier<M> {
    /// Wrap `model` with the default deadline.
    #[must_use]
    pub const fn new(model: M) -> Self {
        Self {
            model,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-call deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the wrapped model.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }
}

#[async_trait]
impl<M: CompletionModel> Classifier for ModelClassifier<M> {
    async fn classify(&self, prompt: &str) -> Result<String, UpstreamError> {
        let request = CompletionRequest::new(prompt);
        let response = complete_within(&self.model, &request, self.timeout).await?;
        debug!(provider = self.model.provider(), len = response.len(), "classifier answered");
        Ok(response)
    }
}

/// Run one completion under `timeout`, requiring non-blank text.
pub(crate) async fn complete_within<M: CompletionModel + ?Sized>(
    model: &M,
    request: &CompletionRequest,
    timeout: Duration,
) -> Result<String, UpstreamError> {
    debug!(
        provider = model.provider(),
        model = model.model_id(),
        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        "completion call"
    );
    let response: ModelResponse = tokio::time::timeout(timeout, model.generate(request))
        .await
        .map_err(|_| UpstreamError::timeout(timeout).with_provider(model.provider()))??;

    response
        .non_empty_text()
        .ok_or_else(|| UpstreamError::empty_response().with_provider(model.provider()))
}
