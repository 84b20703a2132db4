use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// One struct serves both completion and embedding profiles; fields that do
/// not apply to a provider are ignored by its client.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Perplexity,
///     model: "llama-3.1-sonar-small-128k-online".to_string(),
///     endpoint: "https://api.perplexity.ai".to_string(),
///     api_key: Some("pplx-...".to_string()),
///     max_tokens: Some(500),
///     temperature: Some(0.7),
///     top_p: None,
///     timeout_secs: Some(10),
/// };
/// assert!(cfg.provider.requires_api_key());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// The provider/backend.
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// Base URL of the provider API (no trailing path).
    pub endpoint: String,

    /// Optional API key for bearer authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}
