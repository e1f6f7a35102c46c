//! The agent runtime invoked between the input and output gates.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::AgentProfile;
use crate::classifier::complete_within;
use crate::config::DEFAULT_TIMEOUT;
use crate::error::UpstreamError;
use crate::providers::{CompletionModel, CompletionRequest};

/// Produces the agent's answer for a message.
///
/// The runner treats the output as a single complete string; no streaming
/// is involved.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Run `profile` on `message`.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] if the underlying call fails, times out,
    /// or produces no text.
    async fn run(&self, profile: &AgentProfile, message: &str) -> Result<String, UpstreamError>;
}

/// [`AgentRuntime`] that sends the profile instructions as the system prompt
/// and the message as the user turn.
#[derive(Debug, Clone)]
pub struct CompletionAgent<M> {
    model: M,
    timeout: Duration,
}

impl<M: CompletionModel> CompletionAgent<M> {
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
impl<M: CompletionModel> AgentRuntime for CompletionAgent<M> {
    async fn run(&self, profile: &AgentProfile, message: &str) -> Result<String, UpstreamError> {
        let request =
            CompletionRequest::new(message).with_system(profile.get_instructions());
        let text = complete_within(&self.model, &request, self.timeout).await?;
        debug!(profile = profile.name(), len = text.len(), "agent answered");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamErrorKind;
    use crate::providers::{MockModel, MockReply};

    #[tokio::test]
    async fn test_sends_instructions_as_system() {
        let agent = CompletionAgent::new(MockModel::new().otherwise("4"));
        let profile = AgentProfile::new("math").instructions("Solve step by step.");

        let text = agent.run(&profile, "What is 2 + 2?").await.unwrap();
        assert_eq!(text, "4");

        let requests = agent.model().requests();
        assert_eq!(requests[0].prompt, "What is 2 + 2?");
        assert_eq!(requests[0].system.as_deref(), Some("Solve step by step."));
    }

    #[tokio::test]
    async fn test_empty_instructions_send_no_system() {
        let agent = CompletionAgent::new(MockModel::new().otherwise("hi"));
        agent.run(&AgentProfile::new("bare"), "hello").await.unwrap();
        assert!(agent.model().requests()[0].system.is_none());
    }

    #[tokio::test]
    async fn test_empty_answer_is_upstream_error() {
        let agent = CompletionAgent::new(MockModel::new());
        let err = agent.run(&AgentProfile::new("bare"), "hello").await.unwrap_err();
        assert_eq!(err.kind, UpstreamErrorKind::EmptyResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let agent = CompletionAgent::new(MockModel::new().otherwise_reply(MockReply::Hang))
            .with_timeout(Duration::from_secs(5));
        let err = agent.run(&AgentProfile::new("bare"), "hello").await.unwrap_err();
        assert!(err.is_timeout());
    }
}
