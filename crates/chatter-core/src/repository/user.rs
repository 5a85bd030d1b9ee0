//! User repository trait definition.

use chatter_types::error::RepositoryError;
use chatter_types::user::{User, UserId};

/// Repository trait for user persistence.
///
/// Implementations live in chatter-infra (`SqliteUserRepository`, `InMemoryStore`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait UserRepository: Send + Sync {
    /// Persist a new user. A taken username yields `RepositoryError::Conflict`.
    fn create_user(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Get a user by id, `NotFound` if absent.
    fn get_user(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Get a user by exact (case-sensitive) username, `NotFound` if absent.
    fn get_user_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Count registered users.
    fn count_users(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
