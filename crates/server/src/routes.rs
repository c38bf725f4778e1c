// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use crate::state::AppState;
use crate::{auth, cors, handlers, ws};
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the full router: health is always reachable unauthenticated;
/// everything else goes through `auth::require_bearer_token` when the
/// server was started with a token configured.
pub fn create_router(state: AppState) -> Router {
    let cors_layer = cors::layer((*state.cors_allow_list).clone());

    let authenticated = Router::new()
        .route("/api/executions", get(handlers::list_executions))
        .route("/api/executions/:id", get(handlers::get_execution))
        .route("/api/stats", get(handlers::stats))
        .route("/api/queue", get(handlers::list_queue).post(handlers::add_queue_item).delete(handlers::clear_queue))
        .route("/api/queue/:id", delete(handlers::remove_queue_item))
        .route("/api/queue/:id/up", post(handlers::move_queue_item_up))
        .route("/api/queue/:id/down", post(handlers::move_queue_item_down))
        .route("/api/queue/add/:key", post(handlers::add_queue_item_by_key))
        .route("/api/queue/reorder", post(handlers::reorder_queue))
        .route("/api/stories", get(handlers::list_stories))
        .route("/api/stories/:key", get(handlers::get_story))
        .route("/api/stories/refresh", post(handlers::refresh_stories))
        .route("/api/execution", get(handlers::get_live_execution))
        .route("/api/execution/start", post(handlers::start_execution))
        .route("/api/execution/start/:key", post(handlers::start_execution_with_key))
        .route("/api/execution/pause", post(handlers::pause_execution))
        .route("/api/execution/resume", post(handlers::resume_execution))
        .route("/api/execution/cancel", post(handlers::cancel_execution))
        .route("/api/execution/skip", post(handlers::skip_execution))
        .route("/api/config", get(handlers::get_config))
        .route("/ws", get(ws::upgrade))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(authenticated)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
