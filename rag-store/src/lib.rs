//! Knowledge store over Qdrant: upserts for the sync job, filtered retrieval for the chatbot.
//!
//! The design is flat and splits responsibilities into focused modules:
//! configuration, Qdrant facade, filters, payload mapping and retrieval.

mod config;
mod embed;
mod errors;
mod filters;
mod payload;
mod qdrant_facade;
mod record;
mod retrieve;

pub use config::{DistanceKind, RagConfig, VectorSpace};
pub use embed::{EmbeddingsProvider, l2_normalize, llm_embedder::LlmEmbedder};
pub use errors::{RagError, Result};
pub use payload::stable_uuid;
pub use record::{
    DEFAULT_MAX_RESULTS, DEFAULT_MIN_RELEVANCE_SCORE, RagFilter, RetrievalParams, RetrievedItem,
    SearchHit, VectorPoint,
};
pub use retrieve::select_content;

use tracing::{error, trace};

/// High-level facade that wires configuration and the Qdrant client.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
}

impl RagStore {
    /// Constructs a new store from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` for invalid settings or `RagError::Qdrant` if the client cannot be built.
    pub fn new(cfg: RagConfig) -> Result<Self> {
        trace!(collection = %cfg.collection, "RagStore::new");
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Creates the collection with cosine distance when it does not exist yet.
    pub async fn ensure_collection(&self, dim: usize) -> Result<bool> {
        self.client
            .ensure_collection(&VectorSpace {
                size: dim,
                distance: self.cfg.distance,
            })
            .await
    }

    /// Upserts points in batches of `upsert_batch`. Returns the number of points written.
    pub async fn upsert(&self, points: Vec<VectorPoint>) -> Result<usize> {
        let mut written = 0;
        let mut rest = points;
        while !rest.is_empty() {
            let tail = rest.split_off(rest.len().min(self.cfg.upsert_batch));
            written += self.client.upsert_points(rest).await?;
            rest = tail;
        }
        Ok(written)
    }

    /// Low-level similarity search with a ready query vector.
    pub async fn search_by_vector(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<&RagFilter>,
    ) -> Result<Vec<SearchHit>> {
        let qfilter = filter.and_then(filters::to_qdrant_filter);
        self.client.search(vector, top_k, qfilter).await
    }

    /// Embeds `query`, searches with the optional exact-match `filter` and keeps
    /// hits scoring at least `params.min_relevance_score`.
    ///
    /// # Errors
    /// Embedding failures, Qdrant failures and timeouts are returned as-is.
    pub async fn retrieve(
        &self,
        query: &str,
        params: RetrievalParams,
        filter: Option<&RagFilter>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<Vec<RetrievedItem>> {
        retrieve::retrieve(&self.client, provider, query, params, filter).await
    }

    /// Same as [`RagStore::retrieve`], but logs failures and returns an empty list.
    pub async fn retrieve_or_empty(
        &self,
        query: &str,
        params: RetrievalParams,
        filter: Option<&RagFilter>,
        provider: &dyn EmbeddingsProvider,
    ) -> Vec<RetrievedItem> {
        match self.retrieve(query, params, filter, provider).await {
            Ok(items) => items,
            Err(err) => {
                error!(error = %err, "retrieval failed; returning no items");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    struct FailingEmbedder;

    impl EmbeddingsProvider for FailingEmbedder {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>>> {
            Box::pin(async { Err(RagError::Config("embedder offline".into())) })
        }
    }

    #[tokio::test]
    async fn retrieval_errors_surface_or_collapse_to_empty() {
        let store = RagStore::new(RagConfig::new_default("http://127.0.0.1:6334", "faq")).unwrap();
        let params = RetrievalParams::default();

        let err = store
            .retrieve("services", params, None, &FailingEmbedder)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("embedder offline"));

        let items = store
            .retrieve_or_empty("services", params, None, &FailingEmbedder)
            .await;
        assert!(items.is_empty());
    }
}
