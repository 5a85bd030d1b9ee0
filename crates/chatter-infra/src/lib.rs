//! Infrastructure layer for Chatter.
//!
//! Contains implementations of the ports defined in `chatter-core`: SQLite
//! storage, Argon2 password hashing, HMAC bearer tokens, and configuration
//! loading.

pub mod config;
pub mod crypto;
pub mod sqlite;
