//! Credential primitives: password hashing and bearer tokens.
//!
//! Defined in chatter-core so services can hash and sign without coupling to a
//! specific algorithm. The Argon2 and HMAC adapters live in chatter-infra.

use chatter_types::error::AuthError;
use chatter_types::user::UserId;

/// Salted one-way password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing string (salt included).
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed stored hash verifies as `false`.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// Issue and verify opaque bearer tokens carrying a user id and an expiry.
pub trait TokenCodec: Send + Sync {
    fn issue_token(&self, user_id: &UserId) -> Result<String, AuthError>;

    /// `None` if the token is malformed, badly signed, or expired.
    fn verify_token(&self, token: &str) -> Option<UserId>;
}
