//! Application error type mapping to HTTP status codes and `{code, message}` bodies.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatter_types::error::{AuthError, ChatError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Registration, login and token errors.
    Auth(AuthError),
    /// Conversation and message errors.
    Chat(ChatError),
    /// Missing or unusable bearer token.
    Unauthorized(String),
    /// Malformed request body or parameters.
    Validation(String),
    /// Resource that cannot exist (e.g. a non-UUID path id).
    NotFound(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

const INTERNAL_MESSAGE: &str = "Internal server error";

impl AppError {
    /// Status, machine-readable code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(AuthError::DuplicateUsername(name)) => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_USERNAME",
                format!("Username '{name}' is already taken"),
            ),
            AppError::Auth(e @ (AuthError::InvalidUsername(_) | AuthError::InvalidPassword(_))) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            AppError::Auth(AuthError::InvalidToken) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid token".to_string(),
            ),
            AppError::Auth(AuthError::UserNotFound) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            AppError::Auth(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
            AppError::Chat(ChatError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                "Conversation not found".to_string(),
            ),
            AppError::Chat(ChatError::Forbidden) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You do not have access to this conversation".to_string(),
            ),
            AppError::Chat(ChatError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(ChatError::StorageError(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        // Detail stays in the log, never in the body.
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        (status, Json(json!({ "code": code, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::from(AuthError::DuplicateUsername("ada".into())), StatusCode::BAD_REQUEST),
            (AppError::from(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (AppError::from(AuthError::UserNotFound), StatusCode::NOT_FOUND),
            (AppError::from(ChatError::Forbidden), StatusCode::FORBIDDEN),
            (AppError::from(ChatError::NotFound), StatusCode::NOT_FOUND),
            (AppError::from(ChatError::Validation("x".into())), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        ];
        for (error, expected) in cases {
            assert_eq!(error.parts().0, expected, "{error:?}");
        }
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let (status, code, message) =
            AppError::from(ChatError::StorageError("disk I/O error at /var/db".into())).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert!(!message.contains("/var/db"));
    }
}
