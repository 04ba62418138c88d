use crate::api::{handlers, AppState};
use crate::metrics::track_metrics;
use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        // Local models
        .route("/predict_svm", get(handlers::predict_svm))
        .route("/predict_decision_tree", get(handlers::predict_decision_tree))
        .route("/predict", get(handlers::predict_consensus))
        // External models
        .route("/consensus_predict", get(handlers::predict_external_consensus))
        // Operational endpoints
        .route("/health", get(handlers::health_check))
        .route("/models", get(handlers::list_models))
        .route("/metrics", get(handlers::metrics))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(track_metrics))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}
