//! Account HTTP handlers.
//!
//! Endpoints:
//! - POST /api/auth/register - Create an account and return a token
//! - POST /api/auth/login    - Exchange credentials for a token
//! - POST /api/auth/logout   - Stateless; the client drops its token
//! - GET  /api/auth/me       - The authenticated user

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Value, json};

use chatter_types::user::{Credentials, PublicUser};

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// Body returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = state
        .auth_service
        .register(&credentials.username, &credentials.password)
        .await?;
    let token = state.auth_service.issue_token(&user.id)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Json<AuthResponse>, AppError> {
    let (user, token) = state
        .auth_service
        .login(&credentials.username, &credentials.password)
        .await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// POST /api/auth/logout
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Logged out" }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state.auth_service.current_user(&user_id).await?;
    Ok(Json(user.into()))
}
