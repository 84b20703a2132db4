//! Shared LLM service used by the chatbot backend.
//!
//! Two logical profiles are managed by [`service_profiles::LlmServiceProfiles`]:
//! - **completion** → chat completion (Perplexity, OpenAI or Ollama)
//! - **embedding**  → text embeddings (Ollama or OpenAI)
//!
//! Configs are built from environment variables (see [`config::default_config`]),
//! clients are thin `reqwest` wrappers, and every failure is normalized into
//! [`error_handler::AiLlmError`].

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, ConfigError};
pub use service_profiles::LlmServiceProfiles;
pub use services::Completion;
