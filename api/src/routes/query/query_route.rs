//! POST /api/query (aliases /api/ai, /ai-query): answers a chatbot query.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use responder::{QueryRequest, ResponseEnvelope};
use tracing::{debug, info};

use crate::{
    core::app_state::AppState, error_handler::AppResult, middleware_layer::request_id::request_id_of,
};

/// Handler: POST /api/query
///
/// In-band failures (no results, provider down) still answer 200 with an apology envelope.
/// Only a body that is not a JSON request object is rejected with 400.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/api/query \
///   -H 'content-type: application/json' \
///   -d '{"query":"What services does NicorAI offer?","responseType":"view"}'
/// ```
pub async fn query_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> AppResult<Json<ResponseEnvelope>> {
    let request_id = request_id_of(&headers);
    let Json(req) = body?;

    debug!(
        request_id = %request_id,
        query = req.query.as_deref().unwrap_or_default(),
        response_type = req.response_type.as_deref().unwrap_or("-"),
        "query_route: start"
    );

    let env = state.generator.generate(req).await;

    info!(
        request_id = %request_id,
        response_id = %env.response_id,
        response_type = ?env.response_type,
        model = %env.metadata.model_used,
        tokens = env.metadata.tokens_used,
        "query_route: done"
    );
    Ok(Json(env))
}
