use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes(max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::status))
        // Catalog
        .route("/movies", get(handlers::list_movies))
        .route("/recommendations", post(handlers::recommend))
        // Artifacts
        .route(
            "/artifacts/:kind",
            put(handlers::upload_artifact).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/artifacts/reload", post(handlers::reload))
}
