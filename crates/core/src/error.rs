//! Error types for the Thinki domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each stage of the generation pipeline has its own error enum; the
//! request-level [`GenerationError`] wraps them.

use thiserror::Error;

/// The request-level error produced by the generation pipeline.
///
/// The `Display` of each variant is the bare cause string; transports add
/// their own framing (the gateway prefixes server errors with
/// "Error generating questions: ").
#[derive(Debug, Error)]
pub enum GenerationError {
    // --- Client-caused ---
    #[error("{0}")]
    Validation(#[from] ValidationError),

    // --- External service ---
    #[error("{0}")]
    Invocation(#[from] ProviderError),

    // --- Content-caused ---
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl GenerationError {
    /// Whether the caller is at fault (maps to HTTP 400).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias using [`GenerationError`].
pub type Result<T> = std::result::Result<T, GenerationError>;

// --- Stage errors ---

/// Request contract violations, detected before any LLM call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Action must be 'generate'")]
    InvalidAction,

    #[error("Subject must be '{expected}' for this endpoint")]
    SubjectMismatch { expected: String },

    #[error("Count must be at least 1")]
    InvalidCount,
}

/// Failures of the LLM invocation itself.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no content: {0}")]
    EmptyResponse(String),
}

/// The model reply could not be turned into JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Failed to parse LLM response as JSON: no JSON array found")]
    NoJsonFound,

    #[error("Failed to parse LLM response as JSON: {0}")]
    InvalidJson(String),
}
