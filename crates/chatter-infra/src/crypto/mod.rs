//! Cryptographic operations for Chatter.
//!
//! - `password`: Argon2id password hashing
//! - `token`: HMAC-SHA256 signed bearer tokens
//! - `key`: signing key resolution and the generated key file

pub mod key;
pub mod password;
pub mod token;
