//! Conversation and message repository trait definition.

use chatter_types::conversation::{Conversation, ConversationUpdate, Message};
use chatter_types::error::RepositoryError;
use chatter_types::user::UserId;
use uuid::Uuid;

/// Repository trait for conversations and their messages.
///
/// Messages live here rather than in a separate repository because every
/// message write also touches its parent conversation (timestamp bump, cascade).
pub trait ConversationRepository: Send + Sync {
    /// List a user's conversations, most recently updated first.
    fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Get a conversation by id, `NotFound` if absent.
    fn get_conversation(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Persist a new conversation. The owner must exist.
    fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Apply a partial update and refresh `updated_at`. Returns the updated row.
    fn update_conversation(
        &self,
        id: &Uuid,
        update: &ConversationUpdate,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Delete a conversation's messages, then the conversation itself.
    ///
    /// Returns whether a conversation row was removed.
    fn delete_conversation(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// List messages of a conversation ordered by creation time ascending.
    ///
    /// An unknown conversation id yields an empty list.
    fn list_messages(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Append a message and bump the parent conversation's `updated_at`.
    ///
    /// `NotFound` if the parent conversation does not exist.
    fn create_message(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    /// Number of messages in one conversation.
    fn count_messages(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count conversations across all users.
    fn count_conversations(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count messages across all conversations.
    fn count_all_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
