use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use taskverse::Session;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub history: Vec<String>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            history: session.history().to_vec(),
            session_id: session.id,
            created_at: session.created_at,
        }
    }
}

fn unknown_session(id: &str) -> ApiError {
    ApiError::NotFound(format!("Session '{}' not found", id))
}

pub async fn create_session(State(assistant): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let session = assistant.new_session().await;
    (StatusCode::CREATED, Json(session.into()))
}

pub async fn get_session(
    State(assistant): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = assistant
        .transcript(&id)
        .await
        .ok_or_else(|| unknown_session(&id))?;
    Ok(Json(session.into()))
}

pub async fn reset_session(
    State(assistant): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = assistant
        .reset_session(&id)
        .await
        .ok_or_else(|| unknown_session(&id))?;
    Ok(Json(session.into()))
}

pub async fn delete_session(
    State(assistant): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if assistant.remove_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(unknown_session(&id))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/reset", post(reset_session))
}
