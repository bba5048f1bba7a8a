use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, integration, launch, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Credential check
        .route("/auth/test", post(integration::test_auth))
        // Integration pipeline
        .route("/integration/run", post(integration::run))
        .route(
            "/integration/run-with-documents",
            post(integration::run_with_documents),
        )
        .route("/integration/status", get(integration::get_status))
        .route("/integration/history", get(integration::get_history))
        .route("/documents/{loan_number}", get(integration::list_documents))
        // Vendor launch handshake
        .route("/generic-framework/launch", post(launch::launch))
        .route(
            "/generic-framework/session/{session_id}",
            get(launch::get_session),
        )
        .route(
            "/generic-framework/session/{session_id}/start",
            get(launch::start_session),
        )
        .with_state(Arc::clone(&state));

    Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
