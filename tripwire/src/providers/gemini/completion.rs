//! Gemini `generateContent` implementation of [`CompletionModel`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::client::GeminiClient;
use crate::error::UpstreamError;
use crate::providers::{CompletionModel, CompletionRequest, ModelResponse};

const PROVIDER: &str = "gemini";

/// A Gemini model bound to a client.
#[derive(Clone)]
pub struct GeminiModel {
    client: GeminiClient,
    model_id: String,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

impl GeminiModel {
    pub(super) fn new(client: GeminiClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.client.base_url(),
            self.model_id
        )
    }

    fn build_request_body(request: &CompletionRequest) -> GenerateContentRequest<'_> {
        GenerateContentRequest {
            system_instruction: request.system.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
        }
    }

    /// A prompt the service refused outright comes back with no candidates
    /// and a block reason; that is a provider error, not an empty answer.
    fn parse_response(response: GenerateContentResponse) -> Result<ModelResponse, UpstreamError> {
        if response.candidates.is_empty()
            && let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason)
        {
            return Err(UpstreamError::provider(
                PROVIDER,
                format!("prompt blocked by service: {reason}"),
            ));
        }

        let text = response.candidates.into_iter().next().and_then(|candidate| {
            let parts = candidate.content?.parts;
            let joined: String = parts.into_iter().filter_map(|p| p.text).collect();
            (!joined.is_empty()).then_some(joined)
        });

        Ok(ModelResponse { text })
    }
}

#[async_trait]
impl CompletionModel for GeminiModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, request), fields(model = %self.model_id, prompt_len = request.prompt.len()))]
    async fn generate(&self, request: &CompletionRequest) -> Result<ModelResponse, UpstreamError> {
        let body = Self::build_request_body(request);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .http_client()
            .post(self.endpoint_url())
            .headers(self.client.auth_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::from(e).with_provider(PROVIDER))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(UpstreamError::http_status(status.as_u16(), error_text).with_provider(PROVIDER));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::from(e).with_provider(PROVIDER))?;

        let response = Self::parse_response(parsed)?;
        debug!(has_text = response.text.is_some(), "Gemini API response");
        Ok(response)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
