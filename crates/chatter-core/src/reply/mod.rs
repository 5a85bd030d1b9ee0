//! Automated reply generation.
//!
//! - `arithmetic`: restricted evaluator for the math rule
//! - `rules`: the ordered keyword cascade
//! - `engine`: the `ReplyEngine` seam used by the chat service

pub mod arithmetic;
pub mod engine;
pub mod rules;
