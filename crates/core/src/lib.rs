//! # Thinki Core
//!
//! Domain types, traits, and the question-generation pipeline.
//! This crate has **no HTTP or provider dependencies**: transports and LLM
//! backends live in their own crates and depend inward on this one.
//!
//! ## Pipeline
//!
//! ```text
//! GenerationRequest ─validate─▶ MergedContext ─▶ prompt ─▶ Provider ─▶ parser ─▶ GenerationResult
//! ```
//!
//! Everything except the provider call is a pure function, so the whole
//! pipeline is testable with a fixed-response [`Provider`].

pub mod context;
pub mod error;
pub mod generator;
pub mod message;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod question;
pub mod request;

// Re-export key types at crate root for ergonomics
pub use context::MergedContext;
pub use error::{GenerationError, ParseError, ProviderError, Result, ValidationError};
pub use generator::{QuestionGenerator, render_prompt};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use question::{GenerationResult, Question};
pub use request::{GenerationRequest, StudentContext, Subject};
