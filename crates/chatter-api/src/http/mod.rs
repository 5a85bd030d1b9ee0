//! HTTP/REST API layer for Chatter.
//!
//! Axum-based JSON API under `/api/` with bearer-token authentication
//! and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
