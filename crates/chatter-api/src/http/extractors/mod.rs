//! Request extractors: bearer-token authentication and JSON bodies with
//! API-shaped rejections.

pub mod auth;
pub mod json;
