//! Type-erased repositories for runtime backend selection.
//!
//! Follows the blanket-impl pattern:
//! 1. Define an object-safe `*Dyn` trait with boxed futures
//! 2. Blanket-impl the `*Dyn` trait for every implementor of the RPITIT trait
//! 3. A `Box*` wrapper holds `Arc<dyn *Dyn>` and implements the RPITIT trait again
//!
//! Services stay generic over the repository traits; the binary pins them to
//! the boxed wrappers so `storage = "sqlite" | "memory"` is a config choice.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chatter_types::conversation::{Conversation, ConversationUpdate, Message};
use chatter_types::error::RepositoryError;
use chatter_types::user::{User, UserId};
use uuid::Uuid;

use super::conversation::ConversationRepository;
use super::user::UserRepository;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Object-safe version of [`UserRepository`].
pub trait UserRepositoryDyn: Send + Sync {
    fn create_user_boxed<'a>(&'a self, user: &'a User)
    -> BoxFuture<'a, Result<User, RepositoryError>>;

    fn get_user_boxed<'a>(&'a self, id: &'a UserId)
    -> BoxFuture<'a, Result<User, RepositoryError>>;

    fn get_user_by_username_boxed<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<User, RepositoryError>>;

    fn count_users_boxed(&self) -> BoxFuture<'_, Result<u64, RepositoryError>>;
}

impl<T: UserRepository> UserRepositoryDyn for T {
    fn create_user_boxed<'a>(
        &'a self,
        user: &'a User,
    ) -> BoxFuture<'a, Result<User, RepositoryError>> {
        Box::pin(self.create_user(user))
    }

    fn get_user_boxed<'a>(
        &'a self,
        id: &'a UserId,
    ) -> BoxFuture<'a, Result<User, RepositoryError>> {
        Box::pin(self.get_user(id))
    }

    fn get_user_by_username_boxed<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<User, RepositoryError>> {
        Box::pin(self.get_user_by_username(username))
    }

    fn count_users_boxed(&self) -> BoxFuture<'_, Result<u64, RepositoryError>> {
        Box::pin(self.count_users())
    }
}

/// Type-erased [`UserRepository`].
#[derive(Clone)]
pub struct BoxUserRepository {
    inner: Arc<dyn UserRepositoryDyn>,
}

impl BoxUserRepository {
    /// Wrap a concrete repository.
    pub fn new<T: UserRepository + 'static>(repo: T) -> Self {
        Self {
            inner: Arc::new(repo),
        }
    }
}

impl UserRepository for BoxUserRepository {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        self.inner.create_user_boxed(user).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, RepositoryError> {
        self.inner.get_user_boxed(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        self.inner.get_user_by_username_boxed(username).await
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        self.inner.count_users_boxed().await
    }
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// Object-safe version of [`ConversationRepository`].
pub trait ConversationRepositoryDyn: Send + Sync {
    fn list_conversations_boxed<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Conversation>, RepositoryError>>;

    fn get_conversation_boxed<'a>(
        &'a self,
        id: &'a Uuid,
    ) -> BoxFuture<'a, Result<Conversation, RepositoryError>>;

    fn create_conversation_boxed<'a>(
        &'a self,
        conversation: &'a Conversation,
    ) -> BoxFuture<'a, Result<Conversation, RepositoryError>>;

    fn update_conversation_boxed<'a>(
        &'a self,
        id: &'a Uuid,
        update: &'a ConversationUpdate,
    ) -> BoxFuture<'a, Result<Conversation, RepositoryError>>;

    fn delete_conversation_boxed<'a>(
        &'a self,
        id: &'a Uuid,
    ) -> BoxFuture<'a, Result<bool, RepositoryError>>;

    fn list_messages_boxed<'a>(
        &'a self,
        conversation_id: &'a Uuid,
    ) -> BoxFuture<'a, Result<Vec<Message>, RepositoryError>>;

    fn create_message_boxed<'a>(
        &'a self,
        message: &'a Message,
    ) -> BoxFuture<'a, Result<Message, RepositoryError>>;

    fn count_messages_boxed<'a>(
        &'a self,
        conversation_id: &'a Uuid,
    ) -> BoxFuture<'a, Result<u64, RepositoryError>>;

    fn count_conversations_boxed(&self) -> BoxFuture<'_, Result<u64, RepositoryError>>;

    fn count_all_messages_boxed(&self) -> BoxFuture<'_, Result<u64, RepositoryError>>;
}

impl<T: ConversationRepository> ConversationRepositoryDyn for T {
    fn list_conversations_boxed<'a>(
        &'a self,
        user_id: &'a UserId,
    ) -> BoxFuture<'a, Result<Vec<Conversation>, RepositoryError>> {
        Box::pin(self.list_conversations(user_id))
    }

    fn get_conversation_boxed<'a>(
        &'a self,
        id: &'a Uuid,
    ) -> BoxFuture<'a, Result<Conversation, RepositoryError>> {
        Box::pin(self.get_conversation(id))
    }

    fn create_conversation_boxed<'a>(
        &'a self,
        conversation: &'a Conversation,
    ) -> BoxFuture<'a, Result<Conversation, RepositoryError>> {
        Box::pin(self.create_conversation(conversation))
    }

    fn update_conversation_boxed<'a>(
        &'a self,
        id: &'a Uuid,
        update: &'a ConversationUpdate,
    ) -> BoxFuture<'a, Result<Conversation, RepositoryError>> {
        Box::pin(self.update_conversation(id, update))
    }

    fn delete_conversation_boxed<'a>(
        &'a self,
        id: &'a Uuid,
    ) -> BoxFuture<'a, Result<bool, RepositoryError>> {
        Box::pin(self.delete_conversation(id))
    }

    fn list_messages_boxed<'a>(
        &'a self,
        conversation_id: &'a Uuid,
    ) -> BoxFuture<'a, Result<Vec<Message>, RepositoryError>> {
        Box::pin(self.list_messages(conversation_id))
    }

    fn create_message_boxed<'a>(
        &'a self,
        message: &'a Message,
    ) -> BoxFuture<'a, Result<Message, RepositoryError>> {
        Box::pin(self.create_message(message))
    }

    fn count_messages_boxed<'a>(
        &'a self,
        conversation_id: &'a Uuid,
    ) -> BoxFuture<'a, Result<u64, RepositoryError>> {
        Box::pin(self.count_messages(conversation_id))
    }

    fn count_conversations_boxed(&self) -> BoxFuture<'_, Result<u64, RepositoryError>> {
        Box::pin(self.count_conversations())
    }

    fn count_all_messages_boxed(&self) -> BoxFuture<'_, Result<u64, RepositoryError>> {
        Box::pin(self.count_all_messages())
    }
}

/// Type-erased [`ConversationRepository`].
#[derive(Clone)]
pub struct BoxConversationRepository {
    inner: Arc<dyn ConversationRepositoryDyn>,
}

impl BoxConversationRepository {
    /// Wrap a concrete repository.
    pub fn new<T: ConversationRepository + 'static>(repo: T) -> Self {
        Self {
            inner: Arc::new(repo),
        }
    }
}

impl ConversationRepository for BoxConversationRepository {
    async fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        self.inner.list_conversations_boxed(user_id).await
    }

    async fn get_conversation(&self, id: &Uuid) -> Result<Conversation, RepositoryError> {
        self.inner.get_conversation_boxed(id).await
    }

    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        self.inner.create_conversation_boxed(conversation).await
    }

    async fn update_conversation(
        &self,
        id: &Uuid,
        update: &ConversationUpdate,
    ) -> Result<Conversation, RepositoryError> {
        self.inner.update_conversation_boxed(id, update).await
    }

    async fn delete_conversation(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        self.inner.delete_conversation_boxed(id).await
    }

    async fn list_messages(&self, conversation_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        self.inner.list_messages_boxed(conversation_id).await
    }

    async fn create_message(&self, message: &Message) -> Result<Message, RepositoryError> {
        self.inner.create_message_boxed(message).await
    }

    async fn count_messages(&self, conversation_id: &Uuid) -> Result<u64, RepositoryError> {
        self.inner.count_messages_boxed(conversation_id).await
    }

    async fn count_conversations(&self) -> Result<u64, RepositoryError> {
        self.inner.count_conversations_boxed().await
    }

    async fn count_all_messages(&self) -> Result<u64, RepositoryError> {
        self.inner.count_all_messages_boxed().await
    }
}
