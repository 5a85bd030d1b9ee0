//! Conversation CRUD HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/conversations      - List the caller's conversations
//! - POST   /api/conversations      - Create a conversation
//! - GET    /api/conversations/{id} - Get a single conversation
//! - PATCH  /api/conversations/{id} - Rename a conversation
//! - DELETE /api/conversations/{id} - Delete a conversation and its messages

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use chatter_types::conversation::{Conversation, ConversationUpdate};

use super::parse_id;
use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::json::{ApiJson, parse_optional_body};
use crate::state::AppState;

/// Request body for creating a conversation. The body itself is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
}

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Conversation>>, AppError> {
    Ok(Json(state.chat_service.list_conversations(&user_id).await?))
}

/// POST /api/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    body: Bytes,
) -> Result<Json<Conversation>, AppError> {
    let request: CreateConversationRequest = parse_optional_body(&body)?;
    let conversation = state
        .chat_service
        .create_conversation(&user_id, request.title)
        .await?;
    Ok(Json(conversation))
}

/// GET /api/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.chat_service.get_conversation(&user_id, &id).await?))
}

/// PATCH /api/conversations/{id}
pub async fn update_conversation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ConversationUpdate>,
) -> Result<Json<Conversation>, AppError> {
    let id = parse_id(&id)?;
    let conversation = state
        .chat_service
        .rename_conversation(&user_id, &id, update)
        .await?;
    Ok(Json(conversation))
}

/// DELETE /api/conversations/{id}
pub async fn delete_conversation(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    state.chat_service.delete_conversation(&user_id, &id).await?;
    Ok(Json(json!({ "message": "Conversation deleted" })))
}
