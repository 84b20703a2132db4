//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of hits requested from the index.
pub const DEFAULT_MAX_RESULTS: u64 = 5;
/// Default minimum similarity score; hits below it are dropped.
pub const DEFAULT_MIN_RELEVANCE_SCORE: f32 = 0.5;
/// Upper bound for `maxResults`.
pub const MAX_RESULTS_CAP: u64 = 50;

/// One knowledge snippet returned for a query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedItem {
    pub id: String,
    pub content: String,
    pub metadata: Map<String, Value>,
    pub relevance_score: f32,
}

impl RetrievedItem {
    /// String metadata field, if present.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Retrieval knobs supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalParams {
    pub max_results: u64,
    pub min_relevance_score: f32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_relevance_score: DEFAULT_MIN_RELEVANCE_SCORE,
        }
    }
}

impl RetrievalParams {
    /// Clamps `max_results` to `1..=50` and the score to `0..=1`.
    ///
    /// A NaN score falls back to the default.
    pub fn clamped(self) -> Self {
        let score = if self.min_relevance_score.is_nan() {
            DEFAULT_MIN_RELEVANCE_SCORE
        } else {
            self.min_relevance_score.clamp(0.0, 1.0)
        };
        Self {
            max_results: self.max_results.clamp(1, MAX_RESULTS_CAP),
            min_relevance_score: score,
        }
    }
}

/// Exact-match metadata filter; every pair must match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RagFilter {
    pub equals: Vec<(String, Value)>,
}

impl RagFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` constraint.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }
}

/// A raw similarity hit before content selection.
#[derive(Clone, Debug)]
pub struct SearchHit {
    /// Point id as stored in Qdrant (UUID or number, stringified).
    pub point_id: String,
    pub score: f32,
    pub payload: Map<String, Value>,
}

/// A vector ready to be written to the collection.
#[derive(Clone, Debug)]
pub struct VectorPoint {
    /// Human-readable id (`faq-12`); the Qdrant point id is derived from it.
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_deserialize_with_defaults_and_clamp() {
        let p: RetrievalParams = serde_json::from_value(json!({"maxResults": 500})).unwrap();
        assert_eq!(p.min_relevance_score, DEFAULT_MIN_RELEVANCE_SCORE);
        let p = p.clamped();
        assert_eq!(p.max_results, MAX_RESULTS_CAP);

        let p = RetrievalParams {
            max_results: 0,
            min_relevance_score: 1.7,
        }
        .clamped();
        assert_eq!(p.max_results, 1);
        assert_eq!(p.min_relevance_score, 1.0);
    }

    #[test]
    fn item_serializes_camel_case() {
        let item = RetrievedItem {
            id: "faq-1".into(),
            content: "We build agents.".into(),
            metadata: Map::new(),
            relevance_score: 0.9,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert!(v.get("relevanceScore").is_some());
    }
}
