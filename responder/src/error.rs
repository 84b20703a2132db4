//! Typed error for the responder crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResponderError>;

#[derive(Debug, Error)]
pub enum ResponderError {
    /// Vector store or embedding failure during retrieval.
    #[error("retrieval error: {0}")]
    Retrieval(#[from] rag_store::RagError),

    /// Completion endpoint failure (transport, status, timeout, empty output).
    #[error("completion error: {0}")]
    Completion(#[from] ai_llm_service::AiLlmError),

    /// Invalid environment configuration.
    #[error("config error: {0}")]
    Config(String),
}
