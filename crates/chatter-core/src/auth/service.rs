//! Credential service: registration, login and token handling.

use std::sync::Arc;

use chatter_types::error::{AuthError, RepositoryError};
use chatter_types::user::{User, UserId};
use chrono::Utc;
use tracing::{debug, info};

use crate::auth::credentials::{PasswordHasher, TokenCodec};
use crate::auth::validation::{validate_password, validate_username};
use crate::repository::user::UserRepository;

/// Password verified against when the username is unknown, so both failure
/// paths pay for one hash verification.
const DUMMY_PASSWORD: &str = "chatter-timing-equalizer";

/// Orchestrates account creation, authentication and bearer tokens.
///
/// Generic over the repository and credential primitives; chatter-core never
/// depends on chatter-infra. Hashing and verification run on tokio's blocking
/// pool so a slow key-derivation function never stalls the async workers.
pub struct AuthService<U: UserRepository, P: PasswordHasher + 'static, T: TokenCodec> {
    user_repo: U,
    hasher: Arc<P>,
    tokens: T,
    dummy_hash: Arc<str>,
}

impl<U: UserRepository, P: PasswordHasher + 'static, T: TokenCodec> AuthService<U, P, T> {
    /// Build the service, hashing the timing-equalizer password up front.
    pub fn new(user_repo: U, hasher: P, tokens: T) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash_password(DUMMY_PASSWORD)?;
        Ok(Self {
            user_repo,
            hasher: Arc::new(hasher),
            tokens,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Access the user repository.
    pub fn user_repo(&self) -> &U {
        &self.user_repo
    }

    /// Register a new account.
    ///
    /// Input is validated before any storage call; the plaintext password is
    /// never stored.
    #[tracing::instrument(name = "register", skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        validate_password(password)?;

        let user = User {
            id: UserId::new(),
            username,
            password_hash: self.hash_password(password).await?,
            created_at: Utc::now(),
        };

        let user = self.user_repo.create_user(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::DuplicateUsername(user.username.clone()),
            other => AuthError::StorageError(other.to_string()),
        })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username/password pair. `None` on unknown user or wrong password.
    #[tracing::instrument(name = "authenticate", skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        match self.user_repo.get_user_by_username(username.trim()).await {
            Ok(user) => {
                let hash: Arc<str> = Arc::from(user.password_hash.as_str());
                if self.verify_password(password, hash).await? {
                    Ok(Some(user))
                } else {
                    debug!("Password mismatch");
                    Ok(None)
                }
            }
            Err(RepositoryError::NotFound) => {
                let _ = self
                    .verify_password(password, Arc::clone(&self.dummy_hash))
                    .await?;
                debug!("Unknown username");
                Ok(None)
            }
            Err(e) => Err(AuthError::StorageError(e.to_string())),
        }
    }

    /// Authenticate and issue a token in one step.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let user = self
            .authenticate(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let token = self.tokens.issue_token(&user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok((user, token))
    }

    pub fn issue_token(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.tokens.issue_token(user_id)
    }

    pub fn verify_token(&self, token: &str) -> Option<UserId> {
        self.tokens.verify_token(token)
    }

    /// Load the user a verified token points at.
    pub async fn current_user(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.user_repo.get_user(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::StorageError(other.to_string()),
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing task failed");
                AuthError::Hashing
            })?
    }

    async fn verify_password(&self, password: &str, hash: Arc<str>) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password verification task failed");
                AuthError::Hashing
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread::ThreadId;

    use super::*;
    use crate::repository::memory::InMemoryStore;

    /// Reversible stand-in for a real hasher. Counts calls and records the
    /// threads it ran on.
    #[derive(Default, Clone)]
    struct PlainHasher {
        hashes: Arc<AtomicUsize>,
        verifications: Arc<AtomicUsize>,
        threads: Arc<Mutex<Vec<ThreadId>>>,
    }

    impl PlainHasher {
        fn record_thread(&self) {
            self.threads.lock().unwrap().push(std::thread::current().id());
        }
    }

    impl PasswordHasher for PlainHasher {
        fn hash_password(&self, password: &str) -> Result<String, AuthError> {
            self.hashes.fetch_add(1, Ordering::SeqCst);
            self.record_thread();
            Ok(format!("plain${password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> bool {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            self.record_thread();
            hash.strip_prefix("plain$") == Some(password)
        }
    }

    /// Token is the user id itself prefixed with "t:".
    struct PlainTokens;

    impl TokenCodec for PlainTokens {
        fn issue_token(&self, user_id: &UserId) -> Result<String, AuthError> {
            Ok(format!("t:{user_id}"))
        }

        fn verify_token(&self, token: &str) -> Option<UserId> {
            token.strip_prefix("t:")?.parse().ok()
        }
    }

    fn service() -> (AuthService<InMemoryStore, PlainHasher, PlainTokens>, PlainHasher) {
        let hasher = PlainHasher::default();
        (
            AuthService::new(InMemoryStore::new(), hasher.clone(), PlainTokens).unwrap(),
            hasher,
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (auth, _) = service();
        let user = auth.register("ada", "lovelace").await.unwrap();
        assert_ne!(user.password_hash, "lovelace");

        let (logged_in, token) = auth.login("ada", "lovelace").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(auth.verify_token(&token), Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_username_regardless_of_password() {
        let (auth, _) = service();
        auth.register("ada", "lovelace").await.unwrap();
        let err = auth.register("ada", "different-pw").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername(name) if name == "ada"));
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let (auth, _) = service();
        assert!(matches!(
            auth.register("ab", "lovelace").await,
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            auth.register("ada", "123").await,
            Err(AuthError::InvalidPassword(_))
        ));
        assert_eq!(auth.user_repo().count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_alike() {
        let (auth, hasher) = service();
        auth.register("ada", "lovelace").await.unwrap();

        assert!(auth.authenticate("ada", "wrong-pw").await.unwrap().is_none());
        assert!(auth.authenticate("nobody", "wrong-pw").await.unwrap().is_none());
        // One verification per attempt, even for the unknown user.
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 2);

        assert!(matches!(
            auth.login("nobody", "wrong-pw").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_dummy_hash_computed_once_at_construction() {
        let (auth, hasher) = service();
        assert_eq!(hasher.hashes.load(Ordering::SeqCst), 1);

        assert!(auth.authenticate("nobody", "pw-one").await.unwrap().is_none());
        assert!(auth.authenticate("ghost", "pw-two").await.unwrap().is_none());

        // Unknown-user logins only verify; none of them hash.
        assert_eq!(hasher.hashes.load(Ordering::SeqCst), 1);
        assert_eq!(hasher.verifications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_hashing_runs_off_the_async_worker() {
        let (auth, hasher) = service();
        hasher.threads.lock().unwrap().clear();
        let worker = std::thread::current().id();

        auth.register("ada", "lovelace").await.unwrap();
        auth.authenticate("ada", "lovelace").await.unwrap();

        let threads = hasher.threads.lock().unwrap().clone();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|id| *id != worker));
    }

    #[tokio::test]
    async fn test_current_user_not_found() {
        let (auth, _) = service();
        assert!(matches!(
            auth.current_user(&UserId::new()).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
