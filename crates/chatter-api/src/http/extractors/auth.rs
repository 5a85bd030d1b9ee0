//! Bearer token authentication extractor.
//!
//! Reads `Authorization: Bearer <token>` and verifies the token's signature and
//! expiry. Missing, malformed or expired tokens are rejected with 401.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use chatter_types::user::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller. Extracting this validates the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        state
            .auth_service
            .verify_token(token)
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}

/// Extract the token from the `Authorization` header.
fn extract_bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts.headers.get(AUTHORIZATION).ok_or_else(|| {
        AppError::Unauthorized(
            "Missing token. Provide it via 'Authorization: Bearer <token>'.".to_string(),
        )
    })?;

    let value = header.to_str().map_err(|_| {
        AppError::Unauthorized("Invalid Authorization header encoding".to_string())
    })?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthorized(
            "Authorization header must use the Bearer scheme".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/conversations");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extracts_bearer_token() {
        let parts = parts_with(Some("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&parts).unwrap(), "abc.def");
    }

    #[test]
    fn test_rejects_missing_or_wrong_scheme() {
        assert!(extract_bearer_token(&parts_with(None)).is_err());
        assert!(extract_bearer_token(&parts_with(Some("Basic dXNlcjpwdw=="))).is_err());
        assert!(extract_bearer_token(&parts_with(Some("Bearer   "))).is_err());
    }
}
