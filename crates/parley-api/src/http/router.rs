//! Axum router configuration with middleware.
//!
//! Routes: `/api/chat` (GET, POST; anything else is 405) and `/health`.
//! Middleware: CORS, request tracing. The CORS layer answers every OPTIONS
//! request itself with the allowed origin, methods and headers.

use axum::Router;
use axum::http::{Method, Request, header};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %request.uri().path(),
            request_id = %uuid::Uuid::now_v7(),
        )
    });

    let chat = get(handlers::chat::chat)
        .post(handlers::chat::chat)
        .fallback(handlers::chat::method_not_allowed);

    Router::new()
        .route("/api/chat", chat)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(trace)
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
