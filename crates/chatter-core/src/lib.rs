//! Business logic and repository trait definitions for Chatter.
//!
//! This crate defines the "ports" (repository traits, credential primitives,
//! the reply engine) that the infrastructure layer implements. It depends only
//! on `chatter-types`, never on `chatter-infra` or any database/IO crate.

pub mod auth;
pub mod chat;
pub mod reply;
pub mod repository;
