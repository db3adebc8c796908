//! Incoming generation requests and their validation.
//!
//! Both the request and the student context are open-ended: unknown keys are
//! kept (in input order) so they can feed template placeholders and the
//! formatted context block.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// The only accepted value of [`GenerationRequest::action`].
pub const GENERATE_ACTION: &str = "generate";

/// A subject served by a dedicated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    English,
    Math,
}

impl Subject {
    pub const ALL: [Subject; 2] = [Subject::English, Subject::Math];

    /// Canonical display name ("English", "Math").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Math => "Math",
        }
    }

    /// Case-insensitive match against a free-form subject string.
    pub fn matches(&self, subject: &str) -> bool {
        subject.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|subject| subject.matches(s))
            .ok_or_else(|| format!("unknown subject '{s}' (expected 'english' or 'math')"))
    }
}

/// Student context. Recognized keys are typed; everything else lands in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_english_score: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_math_score: Option<i64>,

    #[serde(default = "default_language")]
    pub language: String,

    /// Any other fields, in the order they were supplied.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_language() -> String {
    "en".into()
}

impl Default for StudentContext {
    fn default() -> Self {
        Self {
            age: None,
            onboarding_english_score: None,
            onboarding_math_score: None,
            language: default_language(),
            extra: Map::new(),
        }
    }
}

/// A request for a batch of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub action: String,

    pub year_band: String,

    pub subject: String,

    pub count: u32,

    /// Expected mastery average, conventionally 0.0–1.0 (not enforced).
    pub ema: f64,

    #[serde(default)]
    pub context: StudentContext,

    /// Optional custom prompt template with `{placeholder}` tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Any other top-level fields, usable as template placeholders.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationRequest {
    /// Check the endpoint contract for `subject`. Runs before any LLM call.
    pub fn validate_for(&self, subject: Subject) -> Result<(), ValidationError> {
        if self.action != GENERATE_ACTION {
            return Err(ValidationError::InvalidAction);
        }

        if !subject.matches(&self.subject) {
            return Err(ValidationError::SubjectMismatch {
                expected: subject.as_str().to_string(),
            });
        }

        if self.count == 0 {
            return Err(ValidationError::InvalidCount);
        }

        Ok(())
    }

    /// The custom template, if one was supplied and is non-empty.
    pub fn custom_template(&self) -> Option<&str> {
        self.template.as_deref().filter(|t| !t.is_empty())
    }
}
