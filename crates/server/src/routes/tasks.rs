//! Direct task handlers that bypass the intent router

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::get,
};
use serde::{Deserialize, Serialize};
use taskverse::{CapabilityOutcome, ErrorKind, Task, TaskId};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub task: String,
    pub date: String,
    pub time: String,
}

impl TaskPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.task.trim().is_empty() {
            return Err(ApiError::BadRequest("task must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub response: String,
}

/// A missing id is a client fault here, unlike the routed endpoints where it
/// is reported as text
fn into_response(outcome: CapabilityOutcome) -> Result<Json<TaskResponse>, ApiError> {
    match outcome.error_kind {
        Some(ErrorKind::NotFound) => Err(ApiError::NotFound(outcome.text)),
        _ => Ok(Json(TaskResponse {
            response: outcome.text,
        })),
    }
}

pub async fn summarize_tasks(State(assistant): State<AppState>) -> Json<TaskResponse> {
    Json(TaskResponse {
        response: assistant.summarize_tasks().await,
    })
}

pub async fn create_task(
    State(assistant): State<AppState>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    tracing::info!("Adding task directly");
    into_response(
        assistant
            .add_task(&payload.task, &payload.date, &payload.time)
            .await,
    )
}

pub async fn get_task(
    State(assistant): State<AppState>,
    id: Result<Path<TaskId>, PathRejection>,
) -> Result<Json<Task>, ApiError> {
    let Path(id) = id?;
    assistant
        .get_task(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Task #{} not found.", id)))
}

pub async fn update_task(
    State(assistant): State<AppState>,
    id: Result<Path<TaskId>, PathRejection>,
    payload: Result<Json<TaskPayload>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    payload.validate()?;

    into_response(
        assistant
            .update_task_by_id(id, &payload.task, &payload.date, &payload.time)
            .await,
    )
}

pub async fn delete_task(
    State(assistant): State<AppState>,
    id: Result<Path<TaskId>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Path(id) = id?;
    into_response(assistant.delete_task_by_id(id).await)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(summarize_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
