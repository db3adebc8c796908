//! `thinki generate`: Run the full pipeline once and print the result.

use std::path::Path;

use thinki_config::AppConfig;
use thinki_core::Subject;

pub async fn run(subject: Subject, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let request = super::read_request(file)?;
    let generator = super::build_generator(&config)?;

    let result = generator.generate(subject, &request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
