//! Scoped conversational endpoints: one per capability family

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::Deserialize;
use taskverse::{AssistantReply, CapabilityScope};

use crate::{AppState, error::ApiError};

/// A missing utterance is routed as an empty one; the classifier answers it
/// with its fallback text rather than the request being rejected.
#[derive(Debug, Default, Deserialize)]
pub struct UtteranceRequest {
    #[serde(default)]
    pub utterance: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Route one utterance within `scope` on behalf of the caller's session
pub async fn respond(
    assistant: &AppState,
    scope: CapabilityScope,
    request: UtteranceRequest,
) -> AssistantReply {
    assistant
        .handle(scope, &request.utterance, request.session_id.as_deref())
        .await
}

pub async fn task_manager(
    State(assistant): State<AppState>,
    payload: Result<Json<UtteranceRequest>, JsonRejection>,
) -> Result<Json<AssistantReply>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(respond(&assistant, CapabilityScope::Tasks, request).await))
}

pub async fn email_manager(
    State(assistant): State<AppState>,
    payload: Result<Json<UtteranceRequest>, JsonRejection>,
) -> Result<Json<AssistantReply>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(respond(&assistant, CapabilityScope::Email, request).await))
}

pub async fn general_chat(
    State(assistant): State<AppState>,
    payload: Result<Json<UtteranceRequest>, JsonRejection>,
) -> Result<Json<AssistantReply>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(respond(&assistant, CapabilityScope::Chat, request).await))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/task", post(task_manager))
        .route("/email", post(email_manager))
        .route("/chat", post(general_chat))
}
