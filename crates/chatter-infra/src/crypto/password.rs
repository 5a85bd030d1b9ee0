//! Argon2id password hashing.
//!
//! Implements the `PasswordHasher` trait from `chatter-core` using the
//! `argon2` crate (RustCrypto ecosystem). Hashes are PHC strings, so the
//! algorithm, parameters and salt travel with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chatter_core::auth::credentials::PasswordHasher;
use chatter_types::error::AuthError;

/// Argon2id implementation of `PasswordHasher`.
///
/// Uses OWASP recommended parameters:
/// - 19 MiB memory (19456 KiB)
/// - 2 iterations
/// - 1 parallelism degree
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        // Constant parameters within the documented bounds; construction cannot fail.
        let params = Params::new(19456, 2, 1, None).unwrap_or_default();
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Custom cost, e.g. a cheap hasher for tests. Fails on out-of-range values.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, 1, None).map_err(|_| AuthError::Hashing)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!(error = %e, "Argon2 hashing failed");
                AuthError::Hashing
            })
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
