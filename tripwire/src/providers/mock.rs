//! Scripted completion model for tests and offline runs.
//!
//! [`MockModel`] answers each prompt from an ordered list of rules: the first
//! rule whose needle occurs in the prompt decides the reply. Every prompt is
//! recorded, so callers can assert how many calls were issued and in which
//! order.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::providers::{CompletionModel, CompletionRequest, ModelResponse};

/// What a [`MockModel`] rule replies with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this text.
    Text(String),
    /// Answer successfully but without any text.
    Empty,
    /// Fail with this error.
    Fail(UpstreamError),
    /// Never answer within any practical deadline.
    Hang,
}

#[derive(Debug)]
struct Rule {
    needle: String,
    reply: MockReply,
}

/// A scripted [`CompletionModel`].
///
/// # Example
///
/// ```rust,ignore
/// let model = MockModel::new()
///     .on("math-related", "Yes, this is math.")
///     .on("safe and non-harmful", "safe")
///     .otherwise("42");
/// ```
#[derive(Debug)]
pub struct MockModel {
    rules: Vec<Rule>,
    fallback: MockReply,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModel {
    /// Create a mock that answers every prompt with an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: MockReply::Empty,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `text` to prompts containing `needle`.
    #[must_use]
    pub fn on(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.on_reply(needle, MockReply::Text(text.into()))
    }

    /// Reply with `reply` to prompts containing `needle`.
    #[must_use]
    pub fn on_reply(mut self, needle: impl Into<String>, reply: MockReply) -> Self {
        self.rules.push(Rule {
            needle: needle.into(),
            reply,
        });
        self
    }

    /// Reply with `text` to prompts no rule matched.
    #[must_use]
    pub fn otherwise(self, text: impl Into<String>) -> Self {
        self.otherwise_reply(MockReply::Text(text.into()))
    }

    /// Reply with `reply` to prompts no rule matched.
    #[must_use]
    pub fn otherwise_reply(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Prompts received so far, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.lock_calls().iter().map(|r| r.prompt.clone()).collect()
    }

    /// Requests received so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.lock_calls().clone()
    }

    /// Number of calls received whose prompt contains `needle`.
    #[must_use]
    pub fn call_count(&self, needle: &str) -> usize {
        self.lock_calls()
            .iter()
            .filter(|r| r.prompt.contains(needle))
            .count()
    }

    /// Total number of calls received.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.lock_calls().len()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<CompletionRequest>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reply_for(&self, prompt: &str) -> &MockReply {
        self.rules
            .iter()
            .find(|rule| prompt.contains(&rule.needle))
            .map_or(&self.fallback, |rule| &rule.reply)
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    fn model_id(&self) -> &str {
        "mock"
    }

    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<ModelResponse, UpstreamError> {
        self.lock_calls().push(request.clone());

        match self.reply_for(&request.prompt).clone() {
            MockReply::Text(text) => Ok(ModelResponse::text(text)),
            MockReply::Empty => Ok(ModelResponse::default()),
            MockReply::Fail(err) => Err(err),
            MockReply::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_matching_rule_wins() {
        let model = MockModel::new()
            .on("math", "first")
            .on("math-related", "second")
            .otherwise("fallback");

        let reply = model
            .generate(&CompletionRequest::new("is this math-related?"))
            .await
            .unwrap();
        assert_eq!(reply.text.as_deref(), Some("first"));

        let reply = model
            .generate(&CompletionRequest::new("cooking"))
            .await
            .unwrap();
        assert_eq!(reply.text.as_deref(), Some("fallback"));
    }

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let model = MockModel::new().otherwise("ok");
        model.generate(&CompletionRequest::new("one")).await.unwrap();
        model.generate(&CompletionRequest::new("two")).await.unwrap();

        assert_eq!(model.prompts(), vec!["one", "two"]);
        assert_eq!(model.call_count("one"), 1);
        assert_eq!(model.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_and_empty_replies() {
        let model = MockModel::new()
            .on_reply("boom", MockReply::Fail(UpstreamError::network("reset")))
            .on_reply("quiet", MockReply::Empty);

        let err = model
            .generate(&CompletionRequest::new("boom"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "reset");

        let reply = model
            .generate(&CompletionRequest::new("quiet"))
            .await
            .unwrap();
        assert!(reply.text.is_none());
    }
}
