//! HTTP front door for the NicorAI chatbot backend.

use std::{env, sync::Arc};

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    routes::{
        health::health_route::{health_route, llm_health_route},
        query::{
            query_route::query_route,
            usage_route::{index_route, usage_route},
        },
    },
};

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";

/// Builds the router over `state`. Exposed for in-process tests and embedding.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_route))
        .route("/health", get(health_route))
        .route("/health/llm", get(llm_health_route))
        .route("/api/query", post(query_route).get(usage_route))
        .route("/api/ai", post(query_route).get(usage_route))
        .route("/ai-query", post(query_route))
        .layer(middleware::from_fn(
            middleware_layer::request_id::request_id,
        ))
        .with_state(state)
}

/// Wires state from the environment, binds `API_ADDRESS` and serves until Ctrl+C / SIGTERM.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::Completion;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use futures::future::BoxFuture;
    use rag_store::{RagFilter, RetrievalParams, RetrievedItem};
    use responder::{
        CompletionClient, KnowledgeRetriever, ResponderConfig, ResponderError, ResponseGenerator,
    };
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct OneFaq;

    impl KnowledgeRetriever for OneFaq {
        fn retrieve<'a>(
            &'a self,
            _query: &'a str,
            _params: RetrievalParams,
            _filter: Option<&'a RagFilter>,
        ) -> BoxFuture<'a, Result<Vec<RetrievedItem>, ResponderError>> {
            let item = RetrievedItem {
                id: "faq-1".into(),
                content: "NicorAI builds custom AI agents.".into(),
                metadata: json!({"type": "faq", "question": "What does NicorAI do?"})
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
                relevance_score: 0.92,
            };
            Box::pin(async move { Ok(vec![item]) })
        }
    }

    #[derive(Default)]
    struct CountingModel {
        calls: AtomicUsize,
    }

    impl CompletionClient for CountingModel {
        fn complete<'a>(
            &'a self,
            _prompt: &'a str,
        ) -> BoxFuture<'a, Result<Completion, ResponderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                Ok(Completion {
                    text: "We build custom AI agents.".into(),
                    model: "sonar".into(),
                    tokens_used: 42,
                })
            })
        }
    }

    fn app() -> (Router, Arc<CountingModel>) {
        let model = Arc::new(CountingModel::default());
        let generator = ResponseGenerator::new(
            Arc::new(OneFaq),
            model.clone(),
            ResponderConfig::default(),
        );
        let state = Arc::new(AppState::new(Arc::new(generator), None));
        (router(state), model)
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn llm_health_without_profiles_is_empty() {
        let (app, _) = app();
        let resp = app
            .oneshot(Request::get("/health/llm").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!([]));
    }

    #[tokio::test]
    async fn root_and_get_usage_messages() {
        let (app, _) = app();
        let resp = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(resp).await;
        assert!(body["message"].as_str().unwrap().contains("POST /api/ai"));

        let resp = app
            .oneshot(Request::get("/api/query").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert!(body["message"].as_str().unwrap().contains("responseType"));
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (app, model) = app();
        let resp = app
            .oneshot(post_json("/api/query", "{\"query\": "))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn greeting_is_answered_without_model() {
        let (app, model) = app();
        let resp = app
            .oneshot(post_json("/api/ai", r#"{"query":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["responseType"], "text");
        assert_eq!(body["metadata"]["modelUsed"], "none");
        assert!(!body["responseId"].as_str().unwrap().is_empty());
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn text_query_returns_model_answer() {
        let (app, model) = app();
        let resp = app
            .oneshot(post_json(
                "/ai-query",
                r#"{"query":"What does NicorAI do?","responseType":"text"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["content"]["text"], "We build custom AI agents.");
        assert_eq!(body["metadata"]["modelUsed"], "sonar");
        assert_eq!(body["metadata"]["tokensUsed"], 42);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn request_id_is_propagated_or_generated() {
        let (app, _) = app();
        let req = Request::get("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()["x-request-id"], "abc-123");

        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = resp.headers()["x-request-id"].to_str().unwrap();
        assert_eq!(id.len(), 36);
    }
}
