use super::common::*;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::property::property_router;
use crate::session::{USER_ID_HEADER, USER_ROLE_HEADER};

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn list_requires_a_session() {
    let router = property_router(MemoryProperties::seeded());

    let response = router
        .oneshot(
            Request::get("/api/v1/properties")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_route_approves_for_managers() {
    let repository = MemoryProperties::seeded();
    let router = property_router(Arc::clone(&repository));

    let response = router
        .oneshot(
            Request::post("/api/v1/properties/prop-b/review")
                .header(USER_ID_HEADER, "manager-1")
                .header(USER_ROLE_HEADER, "MANAGER")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(r#"{"status":"ACTIVE"}"#))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["result"]["state"], "success");
    assert_eq!(payload["properties"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["operations"]["review"]["state"], "success");
}
