//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant interactions live behind this facade so the rest of the
//! workspace never touches the builder API directly. Every call is bounded
//! by the configured timeout.

use std::future::Future;
use std::time::Duration;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, Filter, PointStruct, SearchParamsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use tracing::{debug, info};

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;
use crate::payload::{json_to_payload, payload_to_json, point_id_to_string, stable_uuid};
use crate::record::{SearchHit, VectorPoint};

/// A facade over the Qdrant client bound to one collection.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
    timeout: Duration,
    exact: bool,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// The client connects lazily; no network call happens here.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
            timeout: cfg.timeout,
            exact: cfg.exact_search,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, RagError>
    where
        F: Future<Output = Result<T, qdrant_client::QdrantError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => Ok(res?),
            Err(_) => Err(RagError::Timeout(self.timeout)),
        }
    }

    /// Ensures that the collection exists; creates it with `space` when missing.
    ///
    /// Returns `true` when the collection was created by this call.
    pub async fn ensure_collection(&self, space: &VectorSpace) -> Result<bool, RagError> {
        if self
            .bounded(self.client.collection_exists(&self.collection))
            .await?
        {
            debug!(collection = %self.collection, "collection already exists");
            return Ok(false);
        }

        let distance = match space.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        info!(
            collection = %self.collection,
            size = space.size,
            distance = ?space.distance,
            "creating collection"
        );
        self.bounded(self.client.create_collection(
            CreateCollectionBuilder::new(&self.collection)
                .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
        ))
        .await?;

        Ok(true)
    }

    /// Upserts a batch of points, waiting for Qdrant to apply them.
    ///
    /// Point ids are UUIDv5 of the readable id; the readable id is also stored
    /// in the payload under `id`. Returns the number of points sent.
    pub async fn upsert_points(&self, points: Vec<VectorPoint>) -> Result<usize, RagError> {
        if points.is_empty() {
            debug!("no points provided for upsert");
            return Ok(0);
        }

        let count = points.len();
        let structs: Vec<PointStruct> = points
            .into_iter()
            .map(|p| {
                let mut payload = p.payload;
                payload.insert("id".into(), serde_json::Value::String(p.id.clone()));
                PointStruct::new(stable_uuid(&p.id), p.vector, json_to_payload(payload))
            })
            .collect();

        debug!(collection = %self.collection, count, "upserting points");
        self.bounded(
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, structs).wait(true)),
        )
        .await?;

        Ok(count)
    }

    /// Similarity search returning hits sorted by descending score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
    ) -> Result<Vec<SearchHit>, RagError> {
        debug!(
            collection = %self.collection,
            top_k,
            filtered = filter.is_some(),
            distance = ?self.distance,
            "searching"
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }
        if self.exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self.bounded(self.client.search_points(builder)).await?;

        let hits: Vec<SearchHit> = res
            .result
            .into_iter()
            .map(|r| SearchHit {
                point_id: point_id_to_string(r.id),
                score: r.score,
                payload: payload_to_json(r.payload),
            })
            .collect();

        debug!(hits = hits.len(), "search completed");
        Ok(hits)
    }
}
