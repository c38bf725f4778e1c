// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use crate::routes::create_router;
use crate::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use devflow_core::EventBus;
use devflow_storage::Store;
use std::sync::Arc;
use tower::ServiceExt;

fn state_with_token(token: Option<&str>) -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db.sqlite")).unwrap());
    let state = AppState::new(store, Arc::new(EventBus::new()), token.map(str::to_string));
    (dir, state)
}

#[tokio::test]
async fn health_is_reachable_without_a_token() {
    let (_dir, state) = state_with_token(Some("secret"));
    let router = create_router(state);
    let response = router.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_route_rejects_missing_token() {
    let (_dir, state) = state_with_token(Some("secret"));
    let router = create_router(state);
    let response = router.oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_accepts_correct_token() {
    let (_dir, state) = state_with_token(Some("secret"));
    let router = create_router(state);
    let response = router
        .oneshot(Request::builder().uri("/api/stats").header("Authorization", "Bearer secret").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn no_token_configured_disables_auth() {
    let (_dir, state) = state_with_token(None);
    let router = create_router(state);
    let response = router.oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
