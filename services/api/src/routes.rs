use crate::infra::{AppState, Backend, InMemoryCategories};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use society_care::catalog::{category_router, CategoryBoard};
use society_care::location::location_router;
use society_care::maintenance::maintenance_router;
use society_care::property::property_router;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Every module router plus the operational endpoints.
pub(crate) fn app_router(backend: &Backend, board: Arc<CategoryBoard<InMemoryCategories>>) -> Router {
    Router::new()
        .merge(location_router(Arc::clone(&backend.locations)))
        .merge(category_router(board))
        .merge(property_router(Arc::clone(&backend.properties)))
        .merge(maintenance_router(
            Arc::clone(&backend.requests),
            Arc::clone(&backend.users),
        ))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
