//! Conversation lifecycle: ownership checks, message pairing and titles.

pub mod service;
pub mod title;
