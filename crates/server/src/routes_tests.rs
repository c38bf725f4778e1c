// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use crate::routes::create_router;
use crate::state::AppState;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use devflow_core::EventBus;
use devflow_storage::Store;
use std::sync::Arc;
use tower::ServiceExt;

fn state() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db.sqlite")).unwrap());
    let state = AppState::new(store, Arc::new(EventBus::new()), Some("secret".to_string()));
    (dir, state)
}

async fn request(router: &axum::Router, method: Method, uri: &str) -> StatusCode {
    router
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).header("Authorization", "Bearer secret").body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn unknown_route_returns_not_found() {
    let (_dir, state) = state();
    let router = create_router(state);
    assert_eq!(request(&router, Method::GET, "/nope").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn queue_route_accepts_get_post_and_delete() {
    let (_dir, state) = state();
    let router = create_router(state);
    assert_eq!(request(&router, Method::GET, "/api/queue").await, StatusCode::OK);
    assert_eq!(request(&router, Method::DELETE, "/api/queue").await, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn queue_route_rejects_unsupported_method() {
    let (_dir, state) = state();
    let router = create_router(state);
    assert_eq!(request(&router, Method::PATCH, "/api/queue").await, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_bypasses_auth_while_api_routes_are_gated() {
    let (_dir, state) = state();
    let router = create_router(state);

    let health = router.clone().oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let stats_without_token =
        router.oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(stats_without_token.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn new_routes_are_reachable() {
    let (_dir, state) = state();
    let router = create_router(state);
    assert_eq!(request(&router, Method::GET, "/api/stories").await, StatusCode::OK);
    assert_eq!(request(&router, Method::GET, "/api/execution").await, StatusCode::OK);
    assert_eq!(request(&router, Method::GET, "/api/config").await, StatusCode::OK);
}

#[tokio::test]
async fn cors_does_not_reflect_an_unapproved_origin() {
    let (_dir, state) = state();
    let router = create_router(state);
    let response = router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "https://evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
