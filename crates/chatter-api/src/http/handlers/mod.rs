//! HTTP request handlers for the REST API.

pub mod auth;
pub mod conversation;
pub mod message;

use uuid::Uuid;

use crate::http::error::AppError;

/// Parse a path id. A non-UUID id names a resource that cannot exist: 404.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse::<Uuid>()
        .map_err(|_| AppError::NotFound(format!("No resource with id '{raw}'")))
}
