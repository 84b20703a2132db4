use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UsageMessage {
    pub message: &'static str,
}

const WELCOME: &str = "Welcome to the NicorAi AI API. Use POST /api/ai with JSON payload \
{'query': 'your question', 'responseType': 'text' or 'view'}.";

const USAGE: &str = "This endpoint accepts POST requests with JSON payload \
{'query': 'your question', 'responseType': 'text' or 'view', \
'retrievalParams': {'maxResults': 5, 'minRelevanceScore': 0.5}}. \
responseType and retrievalParams are optional.";

/// Handler: GET /
pub async fn index_route() -> Json<UsageMessage> {
    Json(UsageMessage { message: WELCOME })
}

/// Handler: GET /api/query and GET /api/ai
pub async fn usage_route() -> Json<UsageMessage> {
    Json(UsageMessage { message: USAGE })
}
