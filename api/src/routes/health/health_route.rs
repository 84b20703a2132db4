use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Handler: GET /health (liveness only, no outbound calls)
pub async fn health_route() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Handler: GET /health/llm
///
/// Probes the completion and embedding providers. Never fails; unreachable
/// providers are reported with `ok: false`.
pub async fn llm_health_route(State(state): State<Arc<AppState>>) -> Json<Vec<HealthStatus>> {
    let Some(llm) = state.llm.as_ref() else {
        debug!("llm_health_route: no provider profiles configured");
        return Json(Vec::new());
    };

    let statuses = llm.health_all().await;
    for s in statuses.iter().filter(|s| !s.ok) {
        warn!(endpoint = %s.endpoint, model = ?s.model, message = %s.message, "llm_health_route: provider unhealthy");
    }
    Json(statuses)
}
