use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for inference.
///
/// - `Perplexity` speaks the OpenAI chat wire format at `{endpoint}/chat/completions`
///   and has no embeddings endpoint.
/// - `OpenAI` uses `{endpoint}/v1/chat/completions` and `{endpoint}/v1/embeddings`.
/// - `Ollama` uses `{endpoint}/api/chat` and `{endpoint}/api/embeddings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI REST API.
    OpenAI,
    /// Perplexity REST API (OpenAI-compatible chat).
    Perplexity,
}

impl LlmProvider {
    /// Default base endpoint when none is configured.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Ollama => "http://localhost:11434",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Perplexity => "https://api.perplexity.ai",
        }
    }

    /// Whether the provider authenticates with a bearer API key.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, LlmProvider::Ollama)
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "perplexity" | "pplx" => Ok(LlmProvider::Perplexity),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_providers_case_insensitively() {
        assert_eq!("Ollama".parse::<LlmProvider>().unwrap(), LlmProvider::Ollama);
        assert_eq!(" openai ".parse::<LlmProvider>().unwrap(), LlmProvider::OpenAI);
        assert_eq!("PPLX".parse::<LlmProvider>().unwrap(), LlmProvider::Perplexity);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = "anthropic".parse::<LlmProvider>().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedProvider(p) if p == "anthropic"));
    }
}
