//! Message HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/conversations/{id}/messages - Messages, oldest first
//! - POST /api/conversations/{id}/messages - Send a message, get the reply

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use chatter_types::conversation::Message;

use super::parse_id;
use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// Request body for sending a message. `content` must be a string.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Both halves of an exchange. `message` is set only when the reply is the
/// apology persisted after a reply-engine failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user_message: Message,
    pub ai_message: Message,
}

/// GET /api/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.chat_service.list_messages(&user_id, &id).await?))
}

/// POST /api/conversations/{id}/messages
///
/// Responds 200 with both messages, or 500 with both messages when the reply
/// engine failed and an apology was stored instead.
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), AppError> {
    let id = parse_id(&id)?;
    let outcome = state
        .chat_service
        .send_message(&user_id, &id, &request.content)
        .await?;

    let status = if outcome.is_degraded() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SendMessageResponse {
            message: outcome
                .is_degraded()
                .then(|| "Failed to generate a reply".to_string()),
            user_message: outcome.user_message,
            ai_message: outcome.assistant_message,
        }),
    ))
}
