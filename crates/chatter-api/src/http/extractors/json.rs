//! JSON body extractor whose rejection is an [`AppError`].
//!
//! axum's own `Json` rejects with plain-text 415/422 responses; the API
//! promises `{code, message}` bodies and 400 for every malformed payload.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::http::error::AppError;

/// Like `axum::Json`, but rejects with `AppError::Validation`.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(AppError::Validation(rejection.body_text())),
        }
    }
}

/// Parse an optional JSON body: an empty body yields `T::default()`.
pub fn parse_optional_body<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Body {
        title: Option<String>,
    }

    #[test]
    fn test_empty_body_is_default() {
        assert_eq!(parse_optional_body::<Body>(b"").unwrap(), Body::default());
        assert_eq!(parse_optional_body::<Body>(b"  \n").unwrap(), Body::default());
    }

    #[test]
    fn test_parses_body() {
        let body: Body = parse_optional_body(br#"{"title":"Hi"}"#).unwrap();
        assert_eq!(body.title.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_malformed_body_is_validation_error() {
        assert!(matches!(
            parse_optional_body::<Body>(b"{not json"),
            Err(AppError::Validation(_))
        ));
    }
}
