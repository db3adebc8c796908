//! LLM Provider implementations for Thinki.
//!
//! All providers implement the `thinki_core::Provider` trait.
//! The router builds the configured one.

mod http;

pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
