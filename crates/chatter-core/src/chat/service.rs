//! Chat service orchestrating conversations and message exchange.
//!
//! ChatService enforces ownership on every conversation operation, pairs each
//! user message with an assistant reply from the `ReplyEngine`, and derives a
//! conversation title from its first message.

use chatter_types::conversation::{Conversation, ConversationUpdate, Message, MessageRole};
use chatter_types::error::ChatError;
use chatter_types::user::UserId;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::chat::title::{MAX_TITLE_CHARS, derive_title};
use crate::reply::engine::ReplyEngine;
use crate::repository::conversation::ConversationRepository;

/// Persisted as the assistant reply when the engine fails.
pub const APOLOGY_REPLY: &str =
    "Sorry, I ran into a problem while generating a reply. Please try again.";

/// Result of sending a message: both persisted messages, plus the engine error
/// when the assistant message is the apology.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub user_message: Message,
    pub assistant_message: Message,
    pub reply_error: Option<String>,
}

impl SendOutcome {
    pub fn is_degraded(&self) -> bool {
        self.reply_error.is_some()
    }
}

/// Orchestrates conversation CRUD and the message/reply cycle.
///
/// Generic over `ConversationRepository` and `ReplyEngine`; chatter-core never
/// depends on chatter-infra.
pub struct ChatService<C: ConversationRepository, R: ReplyEngine> {
    conversation_repo: C,
    engine: R,
}

impl<C: ConversationRepository, R: ReplyEngine> ChatService<C, R> {
    pub fn new(conversation_repo: C, engine: R) -> Self {
        Self {
            conversation_repo,
            engine,
        }
    }

    /// Access the conversation repository.
    pub fn conversation_repo(&self) -> &C {
        &self.conversation_repo
    }

    /// Access the reply engine.
    pub fn engine(&self) -> &R {
        &self.engine
    }

    // --- Conversations ---

    /// The caller's conversations, most recently updated first.
    pub async fn list_conversations(&self, user_id: &UserId) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.conversation_repo.list_conversations(user_id).await?)
    }

    /// Start a conversation. A blank title is treated as no title.
    #[tracing::instrument(name = "create_conversation", skip(self, title))]
    pub async fn create_conversation(
        &self,
        user_id: &UserId,
        title: Option<String>,
    ) -> Result<Conversation, ChatError> {
        let title = match title {
            Some(t) if t.trim().is_empty() => None,
            Some(t) => Some(check_title(&t)?),
            None => None,
        };

        let conversation = Conversation::new(*user_id, title);
        let created = self
            .conversation_repo
            .create_conversation(&conversation)
            .await?;
        info!(conversation_id = %created.id, "Conversation created");
        Ok(created)
    }

    /// Fetch a conversation the caller owns.
    ///
    /// Existence is checked before ownership: `NotFound` wins over `Forbidden`.
    pub async fn get_conversation(
        &self,
        user_id: &UserId,
        id: &Uuid,
    ) -> Result<Conversation, ChatError> {
        let conversation = self.conversation_repo.get_conversation(id).await?;
        if !conversation.is_owned_by(user_id) {
            debug!(conversation_id = %id, "Access to another user's conversation denied");
            return Err(ChatError::Forbidden);
        }
        Ok(conversation)
    }

    /// Rename a conversation. The new title must not be blank.
    #[tracing::instrument(name = "rename_conversation", skip(self, update))]
    pub async fn rename_conversation(
        &self,
        user_id: &UserId,
        id: &Uuid,
        update: ConversationUpdate,
    ) -> Result<Conversation, ChatError> {
        let title = match update.title.as_deref() {
            Some(t) if !t.trim().is_empty() => check_title(t)?,
            _ => return Err(ChatError::Validation("title must not be empty".to_string())),
        };

        self.get_conversation(user_id, id).await?;
        let updated = self
            .conversation_repo
            .update_conversation(id, &ConversationUpdate { title: Some(title) })
            .await?;
        info!(conversation_id = %id, "Conversation renamed");
        Ok(updated)
    }

    /// Delete a conversation and every message in it.
    #[tracing::instrument(name = "delete_conversation", skip(self))]
    pub async fn delete_conversation(&self, user_id: &UserId, id: &Uuid) -> Result<(), ChatError> {
        self.get_conversation(user_id, id).await?;
        if !self.conversation_repo.delete_conversation(id).await? {
            // Removed concurrently between the check and the delete.
            return Err(ChatError::NotFound);
        }
        info!(conversation_id = %id, "Conversation deleted");
        Ok(())
    }

    // --- Messages ---

    /// Messages of a conversation the caller owns, oldest first.
    pub async fn list_messages(&self, user_id: &UserId, id: &Uuid) -> Result<Vec<Message>, ChatError> {
        self.get_conversation(user_id, id).await?;
        Ok(self.conversation_repo.list_messages(id).await?)
    }

    /// Append a user message, derive the title on the first message, then
    /// persist the assistant reply.
    ///
    /// A failing reply engine does not fail the call: an apology is persisted
    /// as the assistant message and the engine error is reported in
    /// [`SendOutcome::reply_error`].
    #[tracing::instrument(name = "send_message", skip(self, content))]
    pub async fn send_message(
        &self,
        user_id: &UserId,
        id: &Uuid,
        content: &str,
    ) -> Result<SendOutcome, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::Validation("content must not be empty".to_string()));
        }

        let conversation = self.get_conversation(user_id, id).await?;

        let user_message = self
            .conversation_repo
            .create_message(&Message::new(*id, MessageRole::User, content))
            .await?;

        if conversation.title.is_none() && self.conversation_repo.count_messages(id).await? == 1 {
            let update = ConversationUpdate {
                title: Some(derive_title(content)),
            };
            self.conversation_repo.update_conversation(id, &update).await?;
            debug!(conversation_id = %id, "Title derived from first message");
        }

        let (reply, reply_error) = match self.engine.reply(content).await {
            Ok(reply) => (reply, None),
            Err(e) => {
                error!(
                    conversation_id = %id,
                    engine = self.engine.name(),
                    error = %e,
                    "Reply generation failed"
                );
                (APOLOGY_REPLY.to_string(), Some(e.to_string()))
            }
        };

        let assistant_message = self
            .conversation_repo
            .create_message(&Message::new(*id, MessageRole::Assistant, reply))
            .await?;

        Ok(SendOutcome {
            user_message,
            assistant_message,
            reply_error,
        })
    }
}

fn check_title(title: &str) -> Result<String, ChatError> {
    let title = title.trim();
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ChatError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use chatter_types::error::ReplyError;
    use chatter_types::user::User;
    use chrono::Utc;

    use super::*;
    use crate::reply::engine::RuleBasedReplyEngine;
    use crate::repository::memory::InMemoryStore;
    use crate::repository::user::UserRepository;

    struct FailingEngine;

    impl ReplyEngine for FailingEngine {
        fn name(&self) -> &str {
            "failing"
        }

        async fn reply(&self, _text: &str) -> Result<String, ReplyError> {
            Err(ReplyError::Unavailable("engine offline".to_string()))
        }
    }

    async fn add_user(store: &InMemoryStore, username: &str) -> UserId {
        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        };
        store.create_user(&user).await.unwrap();
        user.id
    }

    async fn setup() -> (ChatService<InMemoryStore, RuleBasedReplyEngine>, UserId, UserId) {
        let store = InMemoryStore::new();
        let alice = add_user(&store, "alice").await;
        let bob = add_user(&store, "bob").await;
        (
            ChatService::new(store, RuleBasedReplyEngine::new()),
            alice,
            bob,
        )
    }

    #[tokio::test]
    async fn test_list_only_returns_own_conversations() {
        let (chat, alice, bob) = setup().await;
        chat.create_conversation(&alice, Some("mine".into())).await.unwrap();
        chat.create_conversation(&bob, None).await.unwrap();

        let listed = chat.list_conversations(&alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|c| c.is_owned_by(&alice)));
    }

    #[tokio::test]
    async fn test_blank_title_becomes_none() {
        let (chat, alice, _) = setup().await;
        let conv = chat.create_conversation(&alice, Some("   ".into())).await.unwrap();
        assert!(conv.title.is_none());
    }

    #[tokio::test]
    async fn test_overlong_title_rejected() {
        let (chat, alice, _) = setup().await;
        let err = chat
            .create_conversation(&alice, Some("t".repeat(201)))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert!(chat.list_conversations(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_before_forbidden() {
        let (chat, alice, bob) = setup().await;
        let conv = chat.create_conversation(&alice, None).await.unwrap();

        assert!(matches!(
            chat.get_conversation(&bob, &conv.id).await,
            Err(ChatError::Forbidden)
        ));
        assert!(matches!(
            chat.get_conversation(&bob, &Uuid::now_v7()).await,
            Err(ChatError::NotFound)
        ));
        assert!(matches!(
            chat.send_message(&bob, &conv.id, "hello").await,
            Err(ChatError::Forbidden)
        ));
        assert!(matches!(
            chat.delete_conversation(&bob, &conv.id).await,
            Err(ChatError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn test_send_message_pairs_reply_and_derives_title() {
        let (chat, alice, _) = setup().await;
        let conv = chat.create_conversation(&alice, None).await.unwrap();

        let outcome = chat.send_message(&alice, &conv.id, "what is 12 x 4?").await.unwrap();
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.user_message.role, MessageRole::User);
        assert_eq!(outcome.assistant_message.role, MessageRole::Assistant);
        assert!(outcome.assistant_message.content.contains("48"));

        let conv = chat.get_conversation(&alice, &conv.id).await.unwrap();
        assert_eq!(conv.title.as_deref(), Some("what is 12 x 4?"));

        // The second message leaves the title alone.
        chat.send_message(&alice, &conv.id, "hello").await.unwrap();
        let conv = chat.get_conversation(&alice, &conv.id).await.unwrap();
        assert_eq!(conv.title.as_deref(), Some("what is 12 x 4?"));

        let messages = chat.list_messages(&alice, &conv.id).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].content, "what is 12 x 4?");
    }

    #[tokio::test]
    async fn test_existing_title_is_kept() {
        let (chat, alice, _) = setup().await;
        let conv = chat
            .create_conversation(&alice, Some("Maths".into()))
            .await
            .unwrap();
        chat.send_message(&alice, &conv.id, "2 + 2").await.unwrap();
        let conv = chat.get_conversation(&alice, &conv.id).await.unwrap();
        assert_eq!(conv.title.as_deref(), Some("Maths"));
    }

    #[tokio::test]
    async fn test_blank_content_rejected_before_storage() {
        let (chat, alice, _) = setup().await;
        let conv = chat.create_conversation(&alice, None).await.unwrap();
        assert!(matches!(
            chat.send_message(&alice, &conv.id, "  \n ").await,
            Err(ChatError::Validation(_))
        ));
        // Validation precedes the existence check.
        assert!(matches!(
            chat.send_message(&alice, &Uuid::now_v7(), "").await,
            Err(ChatError::Validation(_))
        ));
        assert!(chat.list_messages(&alice, &conv.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_engine_persists_apology() {
        let store = InMemoryStore::new();
        let alice = add_user(&store, "alice").await;
        let chat = ChatService::new(store, FailingEngine);
        let conv = chat.create_conversation(&alice, None).await.unwrap();

        let outcome = chat.send_message(&alice, &conv.id, "hello").await.unwrap();
        assert!(outcome.is_degraded());
        assert_eq!(outcome.assistant_message.content, APOLOGY_REPLY);
        assert!(outcome.reply_error.unwrap().contains("engine offline"));

        let messages = chat.list_messages(&alice, &conv.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, APOLOGY_REPLY);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let (chat, alice, _) = setup().await;
        let conv = chat.create_conversation(&alice, None).await.unwrap();

        assert!(matches!(
            chat.rename_conversation(&alice, &conv.id, ConversationUpdate { title: None })
                .await,
            Err(ChatError::Validation(_))
        ));

        let renamed = chat
            .rename_conversation(
                &alice,
                &conv.id,
                ConversationUpdate {
                    title: Some("  Renamed  ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title.as_deref(), Some("Renamed"));
        assert!(renamed.updated_at >= conv.updated_at);

        chat.send_message(&alice, &conv.id, "hi").await.unwrap();
        chat.delete_conversation(&alice, &conv.id).await.unwrap();
        assert!(matches!(
            chat.get_conversation(&alice, &conv.id).await,
            Err(ChatError::NotFound)
        ));
        assert_eq!(chat.conversation_repo().count_all_messages().await.unwrap(), 0);
    }
}
