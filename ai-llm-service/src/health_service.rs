//! Health checks for LLM backends (Ollama, OpenAI, Perplexity).
//!
//! - Ollama:     `GET {endpoint}/api/tags` (best-effort model existence check)
//! - OpenAI:     `GET {endpoint}/v1/models` with Bearer auth (best-effort model check)
//! - Perplexity: `GET {endpoint}/` with Bearer auth; any non-5xx answer means reachable
//!
//! [`HealthService::check`] never fails: errors are mapped to `ok=false`.
//! Provider-specific probes (`try_*`) return strict `Result`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{AiLlmError, HealthError, HttpError, is_http_endpoint, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g., "Ollama", "Perplexity").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier relevant to the probe.
    pub model: Option<String>,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the main probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker reusing a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks health for a single config, routing to the provider-specific probe.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        if !is_http_endpoint(&cfg.endpoint) {
            warn!(
                provider = ?cfg.provider,
                endpoint = %cfg.endpoint,
                "invalid endpoint (empty or missing http/https)"
            );
            return HealthStatus::new(cfg, false, 0, "endpoint is empty or missing http/https");
        }

        let start = Instant::now();
        let result = match cfg.provider {
            LlmProvider::Ollama => self.try_probe_ollama(cfg).await,
            LlmProvider::OpenAI => self.try_probe_openai(cfg).await,
            LlmProvider::Perplexity => self.try_probe_reachable(cfg).await,
        };

        match result {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    model = %status.model.as_deref().unwrap_or("n/a"),
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    provider = %status.provider,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Checks health for multiple configs; never fails.
    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    fn timeout_for(&self, cfg: &LlmModelConfig) -> Duration {
        cfg.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
    }

    fn get(&self, cfg: &LlmModelConfig, url: &str) -> Result<reqwest::RequestBuilder, AiLlmError> {
        let mut req = self.client.get(url).timeout(self.timeout_for(cfg));
        if let Some(key) = &cfg.api_key {
            let value = header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
            req = req.header(header::AUTHORIZATION, value);
        }
        Ok(req)
    }

    /// Strict Ollama probe: `GET /api/tags`, 2xx, model listed.
    async fn try_probe_ollama(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
        let start = Instant::now();
        debug!(provider = "Ollama", model = %cfg.model, "GET {}", url);

        let resp = self.get(cfg, &url)?.send().await?;
        let latency = start.elapsed().as_millis();
        let resp = ensure_success(resp, url).await?;

        #[derive(serde::Deserialize)]
        struct Tag {
            name: String,
        }
        #[derive(serde::Deserialize)]
        struct Tags {
            models: Option<Vec<Tag>>,
        }

        Ok(match resp.json::<Tags>().await {
            Ok(Tags {
                models: Some(models),
            }) => {
                // Ollama reports `name:tag`; accept a bare name matching `name:latest`.
                let exists = models.iter().any(|m| {
                    m.name == cfg.model || m.name == format!("{}:latest", cfg.model)
                });
                if exists {
                    HealthStatus::new(cfg, true, latency, "Ollama is healthy; model is available")
                } else {
                    HealthStatus::new(cfg, false, latency, "Ollama is up, but model not found")
                }
            }
            Ok(_) => HealthStatus::new(cfg, true, latency, "Ollama is reachable"),
            Err(e) => HealthStatus::new(
                cfg,
                true,
                latency,
                format!("Ollama is reachable; failed to decode /api/tags: {e}"),
            ),
        })
    }

    /// Strict OpenAI probe: `GET /v1/models`, 2xx, model listed.
    async fn try_probe_openai(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));
        let start = Instant::now();
        debug!(provider = "OpenAI", model = %cfg.model, "GET {}", url);

        let resp = self.get(cfg, &url)?.send().await?;
        let latency = start.elapsed().as_millis();
        let resp = ensure_success(resp, url).await?;

        #[derive(serde::Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(serde::Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        Ok(match resp.json::<Models>().await {
            Ok(models) if models.data.iter().any(|m| m.id == cfg.model) => {
                HealthStatus::new(cfg, true, latency, "OpenAI is healthy; model is available")
            }
            Ok(_) => HealthStatus::new(cfg, false, latency, "OpenAI is up, but model not found"),
            Err(e) => HealthStatus::new(
                cfg,
                true,
                latency,
                format!("OpenAI is reachable; failed to decode /v1/models: {e}"),
            ),
        })
    }

    /// Reachability probe for providers without a model listing.
    async fn try_probe_reachable(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let url = format!("{}/", cfg.endpoint.trim_end_matches('/'));
        let start = Instant::now();
        let resp = self.get(cfg, &url)?.send().await?;
        let latency = start.elapsed().as_millis();

        if resp.status().is_server_error() {
            return Err(ensure_success(resp, url).await.err().unwrap_or_else(|| {
                HealthError::Decode("unexpected server error".into()).into()
            }));
        }
        Ok(HealthStatus::new(
            cfg,
            true,
            latency,
            format!("endpoint reachable (HTTP {})", resp.status().as_u16()),
        ))
    }
}

async fn ensure_success(resp: reqwest::Response, url: String) -> Result<reqwest::Response, AiLlmError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    Err(HealthError::HttpStatus(HttpError {
        status,
        url,
        snippet: make_snippet(&text),
    })
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header as hdr, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(provider: LlmProvider, endpoint: String, model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider,
            model: model.into(),
            endpoint,
            api_key: provider.requires_api_key().then(|| "k".to_string()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(2),
        }
    }

    #[tokio::test]
    async fn ollama_model_present_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": [{"name": "nomic-embed-text:latest"}]
            })))
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(2)).unwrap();
        let st = svc
            .check(&cfg(LlmProvider::Ollama, server.uri(), "nomic-embed-text"))
            .await;
        assert!(st.ok, "{}", st.message);
    }

    #[tokio::test]
    async fn openai_missing_model_is_not_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(hdr("authorization", "Bearer k"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "gpt-4o"}]})),
            )
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(2)).unwrap();
        let st = svc
            .check(&cfg(LlmProvider::OpenAI, server.uri(), "gpt-4o-mini"))
            .await;
        assert!(!st.ok);
    }

    #[tokio::test]
    async fn perplexity_404_root_still_counts_as_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let svc = HealthService::new(Some(2)).unwrap();
        let st = svc
            .check(&cfg(LlmProvider::Perplexity, server.uri(), "sonar"))
            .await;
        assert!(st.ok);
        assert!(st.message.contains("404"));
    }

    #[tokio::test]
    async fn invalid_endpoint_never_errors() {
        let svc = HealthService::new(Some(2)).unwrap();
        let st = svc
            .check(&cfg(LlmProvider::Ollama, "localhost".into(), "m"))
            .await;
        assert!(!st.ok);
        assert_eq!(st.latency_ms, 0);
    }
}
