//! Shared domain types for Chatter.
//!
//! Users, conversations, messages, configuration and the error enums shared by
//! every other crate in the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod user;
