//! Named-walker entry points used by the browser chat front end.
//!
//! Every walker answers with a `reports` array. Conversational walkers report
//! a single `{response, session_id}` object; `get_all_tasks` reports one list
//! holding every task, deleted ones included.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use taskverse::{CapabilityScope, ErrorKind, Task, TaskId};

use super::conversation::{UtteranceRequest, respond};
use crate::{AppState, error::ApiError};

pub const GET_ALL_TASKS: &str = "get_all_tasks";

#[derive(Debug, Serialize)]
pub struct WalkerReports<T> {
    pub reports: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct WalkerReply {
    pub response: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

#[derive(Debug, Serialize)]
pub struct TaskContext {
    pub task: String,
    pub date: String,
    pub time: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TaskReport {
    pub id: TaskId,
    pub context: TaskContext,
}

impl From<Task> for TaskReport {
    fn from(task: Task) -> Self {
        let status = task.status();
        Self {
            id: task.id,
            context: TaskContext {
                task: task.description,
                date: task.date,
                time: task.time,
                status,
            },
        }
    }
}

/// Scope served by a conversational walker
pub fn walker_scope(name: &str) -> Option<CapabilityScope> {
    match name {
        "taskverse_ai" => Some(CapabilityScope::All),
        "task_manager" => Some(CapabilityScope::Tasks),
        "email_manager" => Some(CapabilityScope::Email),
        "general_chat" => Some(CapabilityScope::Chat),
        _ => None,
    }
}

pub async fn run_walker(
    State(assistant): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    if name == GET_ALL_TASKS {
        let tasks: Vec<TaskReport> = assistant
            .all_tasks()
            .await
            .into_iter()
            .map(TaskReport::from)
            .collect();
        return Ok(Json(WalkerReports {
            reports: vec![tasks],
        })
        .into_response());
    }

    let scope = walker_scope(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown walker '{}'", name)))?;

    let request: UtteranceRequest = if body.iter().all(u8::is_ascii_whitespace) {
        UtteranceRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid walker payload: {}", e)))?
    };

    tracing::debug!(walker = %name, "Running walker");
    let reply = respond(&assistant, scope, request).await;

    Ok(Json(WalkerReports {
        reports: vec![WalkerReply {
            response: reply.response,
            session_id: reply.session_id,
            error_kind: reply.error_kind,
        }],
    })
    .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/walker/{name}", post(run_walker))
}
