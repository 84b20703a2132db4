//! Retrieval: embed the query, search, apply the score cutoff and select content.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::filters::to_qdrant_filter;
use crate::qdrant_facade::QdrantFacade;
use crate::record::{RagFilter, RetrievalParams, RetrievedItem, SearchHit};

/// Embeds `query` and returns the hits scoring at least `min_relevance_score`.
pub async fn retrieve(
    client: &QdrantFacade,
    provider: &dyn EmbeddingsProvider,
    query: &str,
    params: RetrievalParams,
    filter: Option<&RagFilter>,
) -> Result<Vec<RetrievedItem>, RagError> {
    let params = params.clamped();
    let vector = provider.embed(query).await?;
    let qfilter = filter.and_then(to_qdrant_filter);

    let hits = client.search(vector, params.max_results, qfilter).await?;
    let total = hits.len();
    let items = to_items(hits, params.min_relevance_score);

    info!(
        total,
        kept = items.len(),
        min_score = params.min_relevance_score,
        "retrieval completed"
    );
    Ok(items)
}

/// Applies the `>=` cutoff and maps hits to [`RetrievedItem`]s.
pub(crate) fn to_items(hits: Vec<SearchHit>, min_score: f32) -> Vec<RetrievedItem> {
    hits.into_iter()
        .filter(|h| h.score >= min_score)
        .map(|h| {
            let content = select_content(&h.payload);
            let id = h
                .payload
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(h.point_id);
            debug!(id = %id, score = h.score, "hit kept");
            RetrievedItem {
                id,
                content,
                metadata: h.payload,
                relevance_score: h.score,
            }
        })
        .collect()
}

/// `faq` entries surface `answer`; `company_info` and `structured_data` surface `text`.
/// Other types take whichever of the two is present.
pub fn select_content(payload: &Map<String, Value>) -> String {
    let field = |k: &str| {
        payload
            .get(k)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    let picked = match payload.get("type").and_then(Value::as_str) {
        Some("faq") => field("answer"),
        Some("company_info") | Some("structured_data") => field("text"),
        _ => field("answer").or_else(|| field("text")),
    };
    picked.unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(score: f32, payload: Value) -> SearchHit {
        SearchHit {
            point_id: "0b7c9a5e-0000-5000-8000-000000000000".into(),
            score,
            payload: payload.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn cutoff_is_inclusive() {
        let hits = vec![
            hit(0.9, json!({"type": "faq", "answer": "a"})),
            hit(0.5, json!({"type": "faq", "answer": "b"})),
            hit(0.49, json!({"type": "faq", "answer": "c"})),
        ];
        let items = to_items(hits, 0.5);
        let contents: Vec<_> = items.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, ["a", "b"]);
    }

    #[test]
    fn content_depends_on_entry_type() {
        let faq = json!({"type": "faq", "answer": "ans", "text": "txt"});
        let info = json!({"type": "company_info", "answer": "ans", "text": "txt"});
        let structured = json!({"type": "structured_data", "text": "rows"});
        let untyped = json!({"text": "only text"});
        assert_eq!(select_content(faq.as_object().unwrap()), "ans");
        assert_eq!(select_content(info.as_object().unwrap()), "txt");
        assert_eq!(select_content(structured.as_object().unwrap()), "rows");
        assert_eq!(select_content(untyped.as_object().unwrap()), "only text");
    }

    #[test]
    fn readable_id_from_payload_wins_over_point_id() {
        let items = to_items(vec![hit(0.8, json!({"id": "faq-3", "type": "faq"}))], 0.0);
        assert_eq!(items[0].id, "faq-3");
        assert_eq!(items[0].content, "");
        assert_eq!(items[0].meta_str("type"), Some("faq"));

        let items = to_items(vec![hit(0.8, json!({}))], 0.0);
        assert!(items[0].id.starts_with("0b7c9a5e"));
    }
}
