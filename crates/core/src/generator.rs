//! The generation pipeline: validate → merge context → build prompt →
//! invoke provider → parse reply.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::MergedContext;
use crate::error::Result;
use crate::parser::parse_questions;
use crate::prompt::build_prompt;
use crate::provider::{Provider, ProviderRequest};
use crate::question::GenerationResult;
use crate::request::{GenerationRequest, Subject};

/// Validate `request` for the endpoint bound to `subject` and build its prompt.
///
/// No provider is involved; `generate` runs exactly this before invoking one.
pub fn render_prompt(subject: Subject, request: &GenerationRequest) -> Result<String> {
    request.validate_for(subject)?;
    let context = MergedContext::merge(&request.context);
    Ok(build_prompt(request, &context))
}

/// Turns [`GenerationRequest`]s into [`GenerationResult`]s using one provider.
///
/// Stateless between requests; share it behind an `Arc`.
pub struct QuestionGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl QuestionGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the full pipeline for an endpoint bound to `subject`.
    pub async fn generate(
        &self,
        subject: Subject,
        request: &GenerationRequest,
    ) -> Result<GenerationResult> {
        let prompt = render_prompt(subject, request)?;

        info!(
            subject = %subject,
            count = request.count,
            custom_template = request.custom_template().is_some(),
            provider = self.provider.name(),
            model = %self.model,
            "Generating questions"
        );
        debug!(prompt_len = prompt.len(), "Prompt built");

        let mut provider_request = ProviderRequest::prompt(&self.model, prompt);
        provider_request.temperature = self.temperature;
        provider_request.max_tokens = self.max_tokens;

        let response = self
            .provider
            .complete(provider_request)
            .await
            .inspect_err(|e| warn!(error = %e, "Provider call failed"))?;

        let questions = parse_questions(&response.message.content, request.count as usize)
            .inspect_err(|e| {
                warn!(error = %e, reply_len = response.message.content.len(), "Unparseable model reply")
            })?;

        if questions.len() < request.count as usize {
            debug!(
                requested = request.count,
                produced = questions.len(),
                "Model returned fewer valid questions than requested"
            );
        }

        Ok(GenerationResult::success(subject.as_str(), questions))
    }
}
