//! Google Gemini native provider.
//!
//! Uses the Generative Language API `generateContent` method directly.
//!
//! Features:
//! - `x-goog-api-key` header authentication (not Bearer)
//! - System messages sent as `systemInstruction`
//! - Reply text is the concatenation of the first candidate's text parts

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thinki_core::message::{Message, Role};
use thinki_core::provider::*;
use thinki_core::ProviderError;
use tracing::debug;

use crate::http::{DEFAULT_TIMEOUT_SECS, build_client, check_status, send_error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ProviderError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    /// Build the request body. System messages become `systemInstruction`.
    fn to_api_request(request: &ProviderRequest) -> GenerateContentRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for msg in &request.messages {
            let part = Part {
                text: Some(msg.content.clone()),
            };
            match msg.role {
                Role::System => system_parts.push(part),
                Role::User => contents.push(Content {
                    role: Some("user".into()),
                    parts: vec![part],
                }),
                Role::Assistant => contents.push(Content {
                    role: Some("model".into()),
                    parts: vec![part],
                }),
            }
        }

        GenerateContentRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then(|| Content {
                role: None,
                parts: system_parts,
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    fn to_provider_response(
        api: GenerateContentResponse,
        requested_model: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let Some(candidate) = api.candidates.into_iter().next() else {
            let reason = api
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked ({r})"))
                .unwrap_or_else(|| "no candidates in response".into());
            return Err(ProviderError::EmptyResponse(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .map(|r| format!("candidate has no text (finish reason: {r})"))
                .unwrap_or_else(|| "candidate has no text".into());
            return Err(ProviderError::EmptyResponse(reason));
        }

        let usage = api.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage,
            model: api.model_version.unwrap_or_else(|| requested_model.to_string()),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = self.endpoint(&request.model);
        let body = Self::to_api_request(&request);

        debug!(provider = "gemini", model = %request.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let response = check_status("gemini", &request.model, response).await?;

        let api_resp: GenerateContentResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Gemini response: {e}"),
            })?;

        Self::to_provider_response(api_resp, &request.model)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(send_error)?;

        Ok(response.status().is_success())
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_defaults() {
        let provider = GeminiProvider::new("key").unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn endpoint_with_custom_base_url() {
        let provider = GeminiProvider::new("key")
            .unwrap()
            .with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            provider.endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            provider.endpoint("models/gemini-2.5-pro"),
            "http://localhost:9999/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let mut request = ProviderRequest::prompt("gemini-2.5-flash", "Generate 2 questions");
        let system = Message {
            role: Role::System,
            ..Message::user("You write quizzes")
        };
        request.messages.insert(0, system);
        request.max_tokens = Some(1024);

        let body = serde_json::to_value(GeminiProvider::to_api_request(&request)).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Generate 2 questions");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You write quizzes");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn request_body_without_system_or_max_tokens() {
        let request = ProviderRequest::prompt("gemini-2.5-flash", "hi");
        let body = serde_json::to_value(GeminiProvider::to_api_request(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn response_text_concatenates_parts() {
        let raw = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "[{\"id\":"}, {"text": "\"1\"}]"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8, "totalTokenCount": 20},
            "modelVersion": "gemini-2.5-flash-001"
        }"#;
        let api: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let response = GeminiProvider::to_provider_response(api, "gemini-2.5-flash").unwrap();
        assert_eq!(response.message.content, r#"[{"id":"1"}]"#);
        assert_eq!(response.model, "gemini-2.5-flash-001");
        assert_eq!(response.usage.unwrap().total_tokens, 20);
    }

    #[test]
    fn blocked_prompt_is_empty_response() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let api: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let err = GeminiProvider::to_provider_response(api, "m").unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse(ref r) if r.contains("SAFETY")));
    }

    #[test]
    fn candidate_without_text_is_empty_response() {
        let raw = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        let api: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let err = GeminiProvider::to_provider_response(api, "m").unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
