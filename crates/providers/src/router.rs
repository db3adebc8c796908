//! Provider selection: builds the configured LLM backend.
//!
//! `gemini` uses the native Gemini provider; every other name is treated as
//! an OpenAI-compatible endpoint.

use std::sync::Arc;
use std::time::Duration;

use thinki_config::{AppConfig, ConfigError};
use thinki_core::provider::Provider;
use tracing::info;

use crate::gemini::GeminiProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider selected by `config.default_provider`.
///
/// Fails with [`ConfigError::MissingApiKey`] when a remote provider has no
/// key, so the server refuses to start instead of failing every request.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let name = config.default_provider.as_str();
    let provider_config = config.active_provider();
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let api_key = match config.resolved_api_key() {
        Some(key) => key,
        None if !requires_api_key(name) => String::new(),
        None => {
            return Err(ConfigError::MissingApiKey {
                provider: name.to_string(),
            });
        }
    };

    let base_url = provider_config
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(name));

    info!(provider = name, base_url = %base_url, "Building LLM provider");

    let provider: Arc<dyn Provider> = if name == "gemini" {
        let p = GeminiProvider::new(api_key)
            .and_then(|p| p.with_timeout(timeout))
            .map_err(client_error)?;
        Arc::new(p.with_base_url(base_url))
    } else {
        let p = OpenAiCompatProvider::new(name, base_url, api_key)
            .and_then(|p| p.with_timeout(timeout))
            .map_err(client_error)?;
        Arc::new(p)
    };

    Ok(provider)
}

fn client_error(err: thinki_core::ProviderError) -> ConfigError {
    ConfigError::ValidationError(err.to_string())
}

/// Local servers accept any key.
fn requires_api_key(provider_name: &str) -> bool {
    !matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "gemini" => "https://generativelanguage.googleapis.com/v1beta".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
