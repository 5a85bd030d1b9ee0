use thiserror::Error;

/// Errors from repository operations (used by trait definitions in chatter-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from registration, login and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("missing or invalid token")]
    InvalidToken,

    #[error("user not found")]
    UserNotFound,

    #[error("password hashing failed")]
    Hashing,

    #[error("token signing failed")]
    Signing,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from conversation and message operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation not found")]
    NotFound,

    #[error("conversation belongs to another user")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::StorageError(other.to_string()),
        }
    }
}

/// Errors raised by a reply engine.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("reply engine unavailable: {0}")]
    Unavailable(String),

    #[error("reply generation failed: {0}")]
    Failed(String),
}

/// Errors from loading configuration or key material.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("unknown storage backend: '{0}'")]
    UnknownStorage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_username_display() {
        let err = AuthError::DuplicateUsername("ada".to_string());
        assert_eq!(err.to_string(), "username 'ada' is already taken");
    }

    #[test]
    fn test_repository_not_found_maps_to_chat_not_found() {
        let err: ChatError = RepositoryError::NotFound.into();
        assert!(matches!(err, ChatError::NotFound));
    }

    #[test]
    fn test_repository_query_maps_to_storage() {
        let err: ChatError = RepositoryError::Query("disk I/O error".to_string()).into();
        assert_eq!(err.to_string(), "storage error: query error: disk I/O error");
    }
}
