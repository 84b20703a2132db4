//! Shared LLM service with two active profiles: `completion` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Clients are built eagerly so that bad credentials/endpoints fail at startup.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//!
//! let out = svc.generate("What does NicorAI do?", None).await?;
//! println!("{} ({} tokens)", out.text, out.tokens_used);
//!
//! let emb = svc.embed("Ferris").await?;
//! println!("Embedding dim = {}", emb.len());
//! # Ok(()) }
//! ```

use crate::{
    config::{
        default_config::{config_completion, config_embedding},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{Completion, ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Provider-specific client behind a profile.
enum Client {
    Ollama(OllamaService),
    OpenAi(OpenAiService),
}

impl Client {
    fn new(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::Ollama => Client::Ollama(OllamaService::new(cfg.clone())?),
            LlmProvider::OpenAI | LlmProvider::Perplexity => {
                Client::OpenAi(OpenAiService::new(cfg.clone())?)
            }
        })
    }
}

/// Shared service that manages the **completion** and **embedding** profiles.
pub struct LlmServiceProfiles {
    completion: LlmModelConfig,
    embedding: LlmModelConfig,

    completion_client: Client,
    embedding_client: Client,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service with both profiles.
    ///
    /// `health_timeout_secs` is the default timeout of the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if any client cannot be constructed.
    pub fn new(
        completion: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            completion_client: Client::new(&completion)?,
            embedding_client: Client::new(&embedding)?,
            completion,
            embedding,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Builds both profiles from environment (see [`crate::config::default_config`]).
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(config_completion()?, config_embedding()?, Some(5))
    }

    /// Generates text using the **completion** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails or times out.
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<Completion, AiLlmError> {
        match &self.completion_client {
            Client::Ollama(cli) => cli.generate(prompt, system).await,
            Client::OpenAi(cli) => cli.generate(prompt, system).await,
        }
    }

    /// Computes embeddings using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding_client {
            Client::Ollama(cli) => cli.embeddings(input).await,
            Client::OpenAi(cli) => cli.embeddings(input).await,
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.completion.clone()];
        if self.embedding != self.completion {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// Model id of the completion profile.
    pub fn completion_model(&self) -> &str {
        &self.completion.model
    }

    /// Returns references to the current profiles `(completion, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.completion, &self.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ollama(endpoint: &str, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn routes_generate_and_embed_to_their_profiles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"content": "ok"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5]})))
            .mount(&server)
            .await;

        let svc = LlmServiceProfiles::new(
            ollama(&server.uri(), "llama3"),
            ollama(&server.uri(), "nomic-embed-text"),
            Some(2),
        )
        .unwrap();

        let out = svc.generate("hello", None).await.unwrap();
        assert_eq!(out.text, "ok");
        assert_eq!(out.model, "llama3");
        assert_eq!(svc.embed("hello").await.unwrap(), vec![0.5]);
        assert_eq!(svc.completion_model(), "llama3");
    }

    #[test]
    fn construction_fails_for_hosted_provider_without_key() {
        let mut completion = ollama("https://api.perplexity.ai", "sonar");
        completion.provider = LlmProvider::Perplexity;
        let res = LlmServiceProfiles::new(completion, ollama("http://localhost:11434", "e"), None);
        assert!(res.is_err());
    }
}
