//! Embedding provider backed by the shared [`LlmServiceProfiles`].

use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use futures::future::BoxFuture;
use tracing::warn;

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;

/// Calls the embedding profile and optionally enforces a vector dimension.
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: Option<usize>,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async move {
            let v = self.svc.embed(text).await?;
            check_dim(v, self.dim)
        })
    }
}

pub(crate) fn check_dim(v: Vec<f32>, want: Option<usize>) -> Result<Vec<f32>, RagError> {
    match want {
        Some(want) if v.len() != want => {
            warn!(got = v.len(), want, "embedding dimension mismatch");
            Err(RagError::VectorSizeMismatch { got: v.len(), want })
        }
        _ => Ok(v),
    }
}
