//! Runtime and collection configuration.
//!
//! Environment variables:
//! - `QDRANT_URL`          = gRPC endpoint (default `http://127.0.0.1:6334`)
//! - `QDRANT_API_KEY`      = optional API key (Qdrant Cloud)
//! - `QDRANT_COLLECTION`   = collection name (default `nicorai-faq`)
//! - `QDRANT_TIMEOUT_SECS` = per-call timeout (default 10)
//! - `QDRANT_BATCH_SIZE`   = upsert batch size (default 64)
//! - `EMBEDDING_DIM`       = expected vector size; enforced when set

use std::time::Duration;

use crate::errors::RagError;

pub const DEFAULT_QDRANT_URL: &str = "http://127.0.0.1:6334";
pub const DEFAULT_COLLECTION: &str = "nicorai-faq";

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance; scores land in [0, 1] for normalized embeddings.
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for the knowledge store.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Upsert batch size.
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Timeout applied to every Qdrant call.
    pub timeout: Duration,
    /// Expected embedding dimension, if known.
    pub vector_dim: Option<usize>,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 64,
            exact_search: false,
            timeout: Duration::from_secs(10),
            vector_dim: None,
        }
    }

    /// Builds the config from environment variables, then validates it.
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(
            env_or("QDRANT_URL", DEFAULT_QDRANT_URL),
            env_or("QDRANT_COLLECTION", DEFAULT_COLLECTION),
        );
        cfg.qdrant_api_key = env_non_empty("QDRANT_API_KEY");
        if let Some(secs) = parse_env::<u64>("QDRANT_TIMEOUT_SECS")? {
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(batch) = parse_env::<usize>("QDRANT_BATCH_SIZE")? {
            cfg.upsert_batch = batch;
        }
        cfg.vector_dim = parse_env::<usize>("EMBEDDING_DIM")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.timeout.is_zero() {
            return Err(RagError::Config("timeout must be > 0".into()));
        }
        if self.vector_dim == Some(0) {
            return Err(RagError::Config("vector dimension must be > 0".into()));
        }
        Ok(())
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_non_empty(name).unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, RagError> {
    match env_non_empty(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{name} is not a valid number: {raw:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RagConfig::new_default(DEFAULT_QDRANT_URL, DEFAULT_COLLECTION);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.distance, DistanceKind::Cosine);
    }

    #[test]
    fn rejects_empty_collection_and_zero_dim() {
        let mut cfg = RagConfig::new_default("http://q:6334", " ");
        assert!(cfg.validate().is_err());
        cfg.collection = "faq".into();
        cfg.vector_dim = Some(0);
        assert!(cfg.validate().is_err());
    }
}
