pub mod doctor;
pub mod generate;
pub mod onboard;
pub mod prompt;
pub mod serve;

use std::io::Read;
use std::path::Path;

use thinki_config::AppConfig;
use thinki_core::{GenerationRequest, QuestionGenerator};

/// Read a request body from `path`, or stdin when `path` is "-".
pub fn read_request(path: &Path) -> Result<GenerationRequest, Box<dyn std::error::Error>> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?
    };

    let request = serde_json::from_str(&raw).map_err(|e| format!("Invalid request JSON: {e}"))?;
    Ok(request)
}

/// Build the generator the server would use for `config`.
pub fn build_generator(config: &AppConfig) -> Result<QuestionGenerator, Box<dyn std::error::Error>> {
    let provider = thinki_providers::build_from_config(config)?;
    Ok(QuestionGenerator::new(provider, config.resolved_model())
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens))
}
