//! Completion service adapters.
//!
//! The pipeline only needs a text-in / text-out call that may fail. Every
//! backend implements [`CompletionModel`], so the classifier and the agent
//! runtime can be pointed at a real service or at a scripted [`MockModel`].
//!
//! # Supported Providers
//!
//! - **Gemini**: Google Generative Language API (`generateContent`)
//! - **Mock**: scripted in-process replies for tests and offline runs
//!
//! # Example
//!
//! ```rust,ignore
//! use tripwire::providers::{CompletionModel, CompletionRequest, GeminiClient};
//!
//! let client = GeminiClient::new("AIza...")?;
//! let model = client.completion_model("gemini-2.0-flash");
//! let response = model.generate(&CompletionRequest::new("What is 2 + 2?")).await?;
//! println!("{}", response.text.unwrap_or_default());
//! ```

mod config;

pub mod gemini;
pub mod mock;

pub use config::HttpClientConfig;
pub use gemini::{GeminiClient, GeminiModel};
pub use mock::{MockModel, MockReply};

use async_trait::async_trait;
use crate::error::UpstreamError;

/// A single-shot completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// The user-facing prompt text.
    pub prompt: String,
    /// Optional system instruction (agent persona).
    pub system: Option<String>,
}

impl CompletionRequest {
    /// Create a request with only a prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
        }
    }

    /// Set the system instruction. Blank instructions are dropped.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        let system = system.into();
        self.system = (!system.trim().is_empty()).then_some(system);
        self
    }
}

/// Response from a completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    /// Generated text, if the service produced any.
    pub text: Option<String>,
}

impl ModelResponse {
    /// Create a response carrying `text`.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Return the text if it is present and not blank.
    #[must_use]
    pub fn non_empty_text(self) -> Option<String> {
        self.text.filter(|t| !t.trim().is_empty())
    }
}

/// The core trait for completion service implementations.
///
/// Implementations must be safe to share across concurrently running
/// pipelines; a call must not depend on any previous call.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Get the model identifier (e.g., "gemini-2.0-flash").
    fn model_id(&self) -> &str;

    /// Short provider name used in logs and error messages.
    fn provider(&self) -> &'static str;

    /// Generate a completion for `request`.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] if the call fails or the response cannot
    /// be parsed.
    async fn generate(&self, request: &CompletionRequest) -> Result<ModelResponse, UpstreamError>;
}

#[async_trait]
impl<M: CompletionModel + ?Sized> CompletionModel for std::sync::Arc<M> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn provider(&self) -> &'static str {
        (**self).provider()
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<ModelResponse, UpstreamError> {
        (**self).generate(request).await
    }
}
