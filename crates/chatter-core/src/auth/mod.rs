//! Credential service and the primitives it is built on.

pub mod credentials;
pub mod service;
pub mod validation;
