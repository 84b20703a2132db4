//! Seams to the collaborators: knowledge retrieval and text completion.

use std::sync::Arc;

use ai_llm_service::{Completion, LlmServiceProfiles};
use futures::future::BoxFuture;
use rag_store::{LlmEmbedder, RagFilter, RagStore, RetrievalParams, RetrievedItem};

use crate::error::ResponderError;

/// Fetches knowledge snippets for a query.
pub trait KnowledgeRetriever: Send + Sync {
    fn retrieve<'a>(
        &'a self,
        query: &'a str,
        params: RetrievalParams,
        filter: Option<&'a RagFilter>,
    ) -> BoxFuture<'a, Result<Vec<RetrievedItem>, ResponderError>>;
}

/// Sends one prompt to the completion model.
pub trait CompletionClient: Send + Sync {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<Completion, ResponderError>>;
}

/// [`KnowledgeRetriever`] over Qdrant using the shared embedding profile.
pub struct RagKnowledge {
    store: Arc<RagStore>,
    embedder: LlmEmbedder,
}

impl RagKnowledge {
    pub fn new(store: Arc<RagStore>, embedder: LlmEmbedder) -> Self {
        Self { store, embedder }
    }
}

impl KnowledgeRetriever for RagKnowledge {
    fn retrieve<'a>(
        &'a self,
        query: &'a str,
        params: RetrievalParams,
        filter: Option<&'a RagFilter>,
    ) -> BoxFuture<'a, Result<Vec<RetrievedItem>, ResponderError>> {
        Box::pin(async move {
            Ok(self
                .store
                .retrieve(query, params, filter, &self.embedder)
                .await?)
        })
    }
}

impl CompletionClient for LlmServiceProfiles {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<Completion, ResponderError>> {
        Box::pin(async move { Ok(self.generate(prompt, None).await?) })
    }
}
