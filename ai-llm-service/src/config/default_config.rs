//! Default LLM configs loaded from environment variables.
//!
//! Two roles are supported:
//!
//! - **Completion** → chat model answering questions and shaping views
//! - **Embedding**  → embedding generator for the vector index
//!
//! # Environment variables
//!
//! Completion:
//! - `LLM_KIND`        = `perplexity` (default), `openai` or `ollama`
//! - `LLM_API_KEY` or `PERPLEXITY_API_KEY` = bearer key (mandatory unless `ollama`)
//! - `LLM_ENDPOINT`    = base URL (provider default if unset)
//! - `LLM_MODEL`       = model id (default `llama-3.1-sonar-small-128k-online`)
//! - `LLM_MAX_TOKENS`  = optional max tokens (default 500)
//! - `LLM_TEMPERATURE` = optional temperature (default 0.7)
//! - `LLM_TIMEOUT_SECS`= request timeout (default 10)
//!
//! Embedding:
//! - `EMBEDDING_KIND`     = `ollama` (default) or `openai`
//! - `EMBEDDING_MODEL`    = model id (mandatory)
//! - `EMBEDDING_ENDPOINT` = base URL; for Ollama `OLLAMA_URL` / `OLLAMA_PORT` are honored
//! - `EMBEDDING_API_KEY`  = bearer key (mandatory for `openai`)
//! - `EMBEDDING_TIMEOUT_SECS` = request timeout (default 10)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt, env_opt_f32, env_opt_u32, env_opt_u64, must_env,
        validate_http_endpoint, validate_range_f32,
    },
};

/// Default completion model (Perplexity online Llama).
pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.1-sonar-small-128k-online";

/// Fixed outbound timeout applied when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Resolves the Ollama endpoint from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. provider default
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(LlmProvider::Ollama.default_endpoint().to_string())
}

fn provider_from_env(var: &'static str, default: LlmProvider) -> Result<LlmProvider, AiLlmError> {
    match env_opt(var) {
        Some(kind) => Ok(kind.parse::<LlmProvider>()?),
        None => Ok(default),
    }
}

/// Constructs the **completion** profile.
///
/// # Defaults
/// - `max_tokens = Some(500)`
/// - `temperature = Some(0.7)`
/// - `timeout_secs = Some(10)`
///
/// # Errors
/// - [`ConfigError::MissingVar`] when a hosted provider has no API key
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
pub fn config_completion() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("LLM_KIND", LlmProvider::Perplexity)?;

    let endpoint = match (env_opt("LLM_ENDPOINT"), provider) {
        (Some(url), _) => url,
        (None, LlmProvider::Ollama) => ollama_endpoint()?,
        (None, p) => p.default_endpoint().to_string(),
    };
    validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;

    let api_key = if provider.requires_api_key() {
        Some(match env_opt("LLM_API_KEY") {
            Some(k) => k,
            None => must_env("PERPLEXITY_API_KEY")?,
        })
    } else {
        None
    };

    let model = env_opt("LLM_MODEL").unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string());
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.or(Some(500));
    let temperature = env_opt_f32("LLM_TEMPERATURE")?.unwrap_or(0.7);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

/// Constructs the **embedding** profile.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(10)`
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `EMBEDDING_MODEL` (or the OpenAI key) is missing
/// - [`ConfigError::UnsupportedProvider`] for Perplexity (no embeddings API)
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env("EMBEDDING_KIND", LlmProvider::Ollama)?;
    if provider == LlmProvider::Perplexity {
        return Err(ConfigError::UnsupportedProvider("perplexity (embeddings)".into()).into());
    }

    let endpoint = match (env_opt("EMBEDDING_ENDPOINT"), provider) {
        (Some(url), _) => url,
        (None, LlmProvider::Ollama) => ollama_endpoint()?,
        (None, p) => p.default_endpoint().to_string(),
    };
    validate_http_endpoint("EMBEDDING_ENDPOINT", &endpoint)?;

    let api_key = if provider.requires_api_key() {
        Some(must_env("EMBEDDING_API_KEY")?)
    } else {
        None
    };

    Ok(LlmModelConfig {
        provider,
        model: must_env("EMBEDDING_MODEL")?,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS)),
    })
}
