use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use rag_store::{LlmEmbedder, RagConfig, RagStore};
use responder::{RagKnowledge, ResponderConfig, ResponseGenerator};
use tracing::info;

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Response pipeline behind the query routes.
    pub generator: Arc<ResponseGenerator>,
    /// Provider profiles for `/health/llm`; `None` when the generator runs on other clients.
    pub llm: Option<Arc<LlmServiceProfiles>>,
}

impl AppState {
    pub fn new(generator: Arc<ResponseGenerator>, llm: Option<Arc<LlmServiceProfiles>>) -> Self {
        Self { generator, llm }
    }

    /// Wires the production collaborators from environment variables.
    ///
    /// Missing credentials or malformed settings fail here, before the listener binds.
    pub fn from_env() -> Result<Self, AppError> {
        let llm = Arc::new(LlmServiceProfiles::from_env()?);
        let rag_cfg = RagConfig::from_env()?;
        let dim = rag_cfg.vector_dim;
        info!(
            collection = %rag_cfg.collection,
            qdrant_url = %rag_cfg.qdrant_url,
            completion_model = %llm.completion_model(),
            "app state configured"
        );

        let store = Arc::new(RagStore::new(rag_cfg)?);
        let knowledge = RagKnowledge::new(store, LlmEmbedder::new(Arc::clone(&llm), dim));
        let generator = ResponseGenerator::new(
            Arc::new(knowledge),
            llm.clone(),
            ResponderConfig::from_env()?,
        );

        Ok(Self::new(Arc::new(generator), Some(llm)))
    }
}
