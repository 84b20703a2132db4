pub mod ollama_service;
pub mod open_ai_service;

use serde::Serialize;

/// Result of a single non-streaming chat completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    /// Generated assistant text, trimmed.
    pub text: String,
    /// Model that produced the text (as reported by the provider, or configured).
    pub model: String,
    /// Total tokens billed for the call (prompt + completion), 0 if unknown.
    pub tokens_used: u32,
}
