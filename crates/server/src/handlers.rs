// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use crate::state::{AppState, ConfigView, LiveExecution};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use devflow_core::clock::{Clock, SystemClock};
use devflow_core::event::Event;
use devflow_core::execution::{ExecutionId, ExecutionStatus};
use devflow_core::queue_item::QueueItemId;
use devflow_core::story::StoryStatus;
use devflow_engine::{AgentCommand, ExecutionControl, Executor};
use devflow_storage::{ExecutionFilter, StorageError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Deserialize)]
pub struct ListExecutionsQuery {
    pub story_key: Option<String>,
    pub epic: Option<u32>,
    pub status: Option<String>,
    pub start_after: Option<u64>,
    pub start_before: Option<u64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn list_executions(
    State(state): State<AppState>,
    Query(query): Query<ListExecutionsQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let filter = ExecutionFilter {
        story_key: query.story_key,
        epic: query.epic,
        status: query.status.as_deref().and_then(parse_status),
        start_after: query.start_after,
        start_before: query.start_before,
        limit: query.limit,
        offset: query.offset,
    };
    let executions = state.store.list_executions(&filter).map_err(storage_error)?;
    Ok(Json(serde_json::json!(executions)))
}

#[derive(Deserialize, Default)]
pub struct GetExecutionQuery {
    #[serde(default)]
    pub output: bool,
}

pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<GetExecutionQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let exec_id = ExecutionId::from_string(id);
    let execution = if query.output {
        state.store.get_execution_with_output(exec_id)
    } else {
        state.store.get_execution(exec_id)
    }
    .map_err(storage_error)?
    .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(serde_json::json!(execution)))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<devflow_storage::Stats>, StatusCode> {
    state.store.stats(SystemClock.epoch_ms()).map(Json).map_err(storage_error)
}

#[derive(Deserialize)]
pub struct AddQueueItemRequest {
    pub story_key: String,
}

pub async fn add_queue_item(State(state): State<AppState>, Json(req): Json<AddQueueItemRequest>) -> Json<serde_json::Value> {
    add_to_queue(&state, req.story_key)
}

pub async fn add_queue_item_by_key(State(state): State<AppState>, Path(story_key): Path<String>) -> Json<serde_json::Value> {
    add_to_queue(&state, story_key)
}

fn add_to_queue(state: &AppState, story_key: String) -> Json<serde_json::Value> {
    let id = state.queue.lock().add(&story_key, SystemClock.epoch_ms());
    state.bus.publish(Event::QueueUpdated { len: state.queue.lock().len() });
    Json(serde_json::json!({ "id": id.to_string() }))
}

pub async fn list_queue(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!(state.queue.lock().items()))
}

pub async fn remove_queue_item(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    let removed = state.queue.lock().remove(QueueItemId::from_string(id));
    state.bus.publish(Event::QueueUpdated { len: state.queue.lock().len() });
    if removed.is_some() { StatusCode::NO_CONTENT } else { StatusCode::NOT_FOUND }
}

pub async fn move_queue_item_up(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.queue.lock().move_up(QueueItemId::from_string(id));
    StatusCode::NO_CONTENT
}

pub async fn move_queue_item_down(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.queue.lock().move_down(QueueItemId::from_string(id));
    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
pub struct ReorderQueueRequest {
    pub ids: Vec<String>,
}

pub async fn reorder_queue(State(state): State<AppState>, Json(req): Json<ReorderQueueRequest>) -> StatusCode {
    let ids: Vec<QueueItemId> = req.ids.into_iter().map(QueueItemId::from_string).collect();
    state.queue.lock().reorder(&ids);
    state.bus.publish(Event::QueueUpdated { len: state.queue.lock().len() });
    StatusCode::NO_CONTENT
}

pub async fn clear_queue(State(state): State<AppState>) -> StatusCode {
    state.queue.lock().clear();
    state.bus.publish(Event::QueueUpdated { len: 0 });
    StatusCode::NO_CONTENT
}

pub async fn list_stories(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!(*state.stories.lock()))
}

pub async fn get_story(State(state): State<AppState>, Path(key): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
    let stories = state.stories.lock();
    let story = stories.iter().find(|s| s.key == key).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(serde_json::json!(story)))
}

pub async fn refresh_stories(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    let source = state.stories_source.lock().clone().ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let stories = devflow_ingest::load_source(&source).map_err(|e| {
        tracing::warn!(error = %e, path = %source.display(), "failed to refresh stories");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    *state.stories.lock() = stories.clone();
    state.bus.publish(Event::Refresh);
    Ok(Json(serde_json::json!(stories)))
}

#[derive(Serialize)]
pub struct ExecutionStatusResponse {
    pub running: bool,
    pub story_key: Option<String>,
    pub execution: Option<serde_json::Value>,
}

pub async fn get_live_execution(State(state): State<AppState>) -> Result<Json<ExecutionStatusResponse>, StatusCode> {
    let live = state.live.lock().clone();
    let Some(live) = live else {
        return Ok(Json(ExecutionStatusResponse { running: false, story_key: None, execution: None }));
    };
    let filter = ExecutionFilter { story_key: Some(live.story_key.clone()), status: Some(ExecutionStatus::Running), ..Default::default() };
    let executions = state.store.list_executions(&filter).map_err(storage_error)?;
    let execution = executions.into_iter().find(|e| e.story_key == live.story_key);
    Ok(Json(ExecutionStatusResponse {
        running: true,
        story_key: Some(live.story_key),
        execution: execution.map(|e| serde_json::json!(e)),
    }))
}

pub async fn start_execution(State(state): State<AppState>) -> Result<StatusCode, StatusCode> {
    start(state, None).await
}

pub async fn start_execution_with_key(State(state): State<AppState>, Path(key): Path<String>) -> Result<StatusCode, StatusCode> {
    start(state, Some(key)).await
}

async fn start(state: AppState, key: Option<String>) -> Result<StatusCode, StatusCode> {
    if state.live.lock().is_some() {
        return Err(StatusCode::CONFLICT);
    }

    let story = {
        let stories = state.stories.lock();
        match &key {
            Some(k) => stories.iter().find(|s| &s.key == k).cloned(),
            None => stories.iter().find(|s| matches!(s.status, StoryStatus::ReadyForDev | StoryStatus::InProgress)).cloned(),
        }
        .ok_or(StatusCode::NOT_FOUND)?
    };

    let control = ExecutionControl::new();
    *state.live.lock() = Some(LiveExecution { story_key: story.key.clone(), control: control.clone() });

    let store = Arc::clone(&state.store);
    let bus = Arc::clone(&state.bus);
    let workflow = Arc::clone(&state.workflow);
    let agent_command = AgentCommand { template: state.agent_command_template.to_string() };
    let live_slot = Arc::clone(&state.live);

    tokio::spawn(async move {
        let executor = Executor::new(store, bus, SystemClock, agent_command);
        if let Err(e) = executor.run_execution(&story, &workflow, &control).await {
            tracing::error!(error = %e, story_key = %story.key, "execution failed");
        }
        *live_slot.lock() = None;
    });

    Ok(StatusCode::ACCEPTED)
}

pub async fn pause_execution(State(state): State<AppState>) -> StatusCode {
    control_op(&state, ExecutionControl::pause)
}

pub async fn resume_execution(State(state): State<AppState>) -> StatusCode {
    control_op(&state, ExecutionControl::resume)
}

pub async fn cancel_execution(State(state): State<AppState>) -> StatusCode {
    control_op(&state, ExecutionControl::cancel)
}

pub async fn skip_execution(State(state): State<AppState>) -> StatusCode {
    control_op(&state, ExecutionControl::skip)
}

fn control_op(state: &AppState, op: impl FnOnce(&ExecutionControl)) -> StatusCode {
    match state.live.lock().as_ref() {
        Some(live) => {
            op(&live.control);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

pub async fn get_config(State(state): State<AppState>) -> Json<ConfigView> {
    Json(state.config_view())
}

fn storage_error(e: StorageError) -> StatusCode {
    tracing::error!(error = %e, "storage error");
    StatusCode::SERVICE_UNAVAILABLE
}

fn parse_status(s: &str) -> Option<ExecutionStatus> {
    match s {
        "running" => Some(ExecutionStatus::Running),
        "succeeded" => Some(ExecutionStatus::Succeeded),
        "failed" => Some(ExecutionStatus::Failed),
        "cancelled" => Some(ExecutionStatus::Cancelled),
        _ => None,
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
