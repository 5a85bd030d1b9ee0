//! Application state wiring all services together.
//!
//! AppState holds the service instances used by both CLI and REST API.
//! Services are generic over repository and credential traits; AppState pins
//! them to the boxed repositories, so the storage backend is picked at runtime
//! from `ServerConfig::storage`.

use std::path::PathBuf;
use std::sync::Arc;

use chatter_core::auth::service::AuthService;
use chatter_core::chat::service::ChatService;
use chatter_core::reply::engine::{BoxReplyEngine, RuleBasedReplyEngine};
use chatter_core::repository::boxed::{BoxConversationRepository, BoxUserRepository};
use chatter_core::repository::memory::InMemoryStore;
use chatter_infra::crypto::key::resolve_token_key;
use chatter_infra::crypto::password::Argon2PasswordHasher;
use chatter_infra::crypto::token::HmacTokenCodec;
use chatter_infra::sqlite::conversation::SqliteConversationRepository;
use chatter_infra::sqlite::pool::{DatabasePool, default_database_url};
use chatter_infra::sqlite::user::SqliteUserRepository;
use chatter_types::config::{ServerConfig, StorageBackend};

/// Concrete type aliases for the service generics.
pub type ConcreteAuthService =
    AuthService<BoxUserRepository, Argon2PasswordHasher, HmacTokenCodec>;

pub type ConcreteChatService = ChatService<BoxConversationRepository, BoxReplyEngine>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<ConcreteAuthService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<ServerConfig>,
    pub data_dir: PathBuf,
}

/// Everything needed to assemble an [`AppState`].
pub struct Components {
    pub users: BoxUserRepository,
    pub conversations: BoxConversationRepository,
    pub hasher: Argon2PasswordHasher,
    pub tokens: HmacTokenCodec,
    pub engine: BoxReplyEngine,
}

impl AppState {
    /// Initialize the application state: open storage, load keys, wire services.
    pub async fn init(config: ServerConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let (users, conversations) = match config.storage {
            StorageBackend::Sqlite => {
                let url = config
                    .database_url
                    .clone()
                    .unwrap_or_else(|| default_database_url(&data_dir));
                let pool = DatabasePool::new(&url).await?;
                (
                    BoxUserRepository::new(SqliteUserRepository::new(pool.clone())),
                    BoxConversationRepository::new(SqliteConversationRepository::new(pool)),
                )
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on exit");
                let store = InMemoryStore::new();
                (
                    BoxUserRepository::new(store.clone()),
                    BoxConversationRepository::new(store),
                )
            }
        };

        let key = resolve_token_key(config.token_secret.as_deref(), &data_dir).await?;
        let tokens = HmacTokenCodec::new(key, config.token_ttl_days);

        tracing::debug!(
            storage = %config.storage,
            data_dir = %data_dir.display(),
            "Application state ready"
        );

        Self::assemble(
            Components {
                users,
                conversations,
                hasher: Argon2PasswordHasher::new(),
                tokens,
                engine: BoxReplyEngine::new(RuleBasedReplyEngine::new()),
            },
            config,
            data_dir,
        )
    }

    /// Wire services from already-built components.
    pub fn assemble(
        components: Components,
        config: ServerConfig,
        data_dir: PathBuf,
    ) -> anyhow::Result<Self> {
        let auth_service =
            AuthService::new(components.users, components.hasher, components.tokens)?;
        let chat_service = ChatService::new(components.conversations, components.engine);

        Ok(Self {
            auth_service: Arc::new(auth_service),
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
            data_dir,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chatter_core::repository::conversation::ConversationRepository;
    use chatter_core::repository::user::UserRepository;

    #[tokio::test]
    async fn test_init_with_sqlite_creates_db_and_key() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::init(ServerConfig::default(), tmp.path().to_path_buf())
            .await
            .unwrap();

        assert!(tmp.path().join("chatter.db").exists());
        assert!(tmp.path().join("token.key").exists());
        assert_eq!(state.auth_service.user_repo().count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_init_with_memory_storage() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            storage: StorageBackend::Memory,
            token_secret: Some("configured".to_string()),
            ..ServerConfig::default()
        };
        let state = AppState::init(config, tmp.path().to_path_buf()).await.unwrap();

        assert!(!tmp.path().join("chatter.db").exists());
        assert!(!tmp.path().join("token.key").exists());
        assert_eq!(
            state
                .chat_service
                .conversation_repo()
                .count_conversations()
                .await
                .unwrap(),
            0
        );
    }
}
