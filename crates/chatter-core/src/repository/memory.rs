//! In-memory implementation of the repository traits.
//!
//! Backed by DashMap id -> entity maps. Cloning an `InMemoryStore` shares the
//! same maps, so one store can serve as both the user and the conversation
//! repository. Contents are lost when the process exits.
//!
//! Lock order is always `conversations` before `messages`.

use std::sync::Arc;

use chatter_types::conversation::{Conversation, ConversationUpdate, Message};
use chatter_types::error::RepositoryError;
use chatter_types::user::{User, UserId};
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::conversation::ConversationRepository;
use super::user::UserRepository;

#[derive(Default)]
struct Maps {
    users: DashMap<UserId, User>,
    /// username -> id, the uniqueness index.
    usernames: DashMap<String, UserId>,
    conversations: DashMap<Uuid, Conversation>,
    /// conversation id -> messages in append order.
    messages: DashMap<Uuid, Vec<Message>>,
}

/// Process-local store implementing [`UserRepository`] and [`ConversationRepository`].
#[derive(Clone, Default)]
pub struct InMemoryStore {
    maps: Arc<Maps>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryStore {
    async fn create_user(&self, user: &User) -> Result<User, RepositoryError> {
        match self.maps.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "username '{}' already exists",
                user.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.maps.users.insert(user.id, user.clone());
                Ok(user.clone())
            }
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<User, RepositoryError> {
        self.maps
            .users
            .get(id)
            .map(|u| u.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        let id = self
            .maps
            .usernames
            .get(username)
            .map(|id| *id)
            .ok_or(RepositoryError::NotFound)?;
        self.get_user(&id).await
    }

    async fn count_users(&self) -> Result<u64, RepositoryError> {
        Ok(self.maps.users.len() as u64)
    }
}

impl ConversationRepository for InMemoryStore {
    async fn list_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let mut conversations: Vec<Conversation> = self
            .maps
            .conversations
            .iter()
            .filter(|c| c.user_id == *user_id)
            .map(|c| c.clone())
            .collect();

        conversations.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(conversations)
    }

    async fn get_conversation(&self, id: &Uuid) -> Result<Conversation, RepositoryError> {
        self.maps
            .conversations
            .get(id)
            .map(|c| c.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        if !self.maps.users.contains_key(&conversation.user_id) {
            return Err(RepositoryError::NotFound);
        }
        match self.maps.conversations.entry(conversation.id) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "conversation {} already exists",
                conversation.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(conversation.clone());
                Ok(conversation.clone())
            }
        }
    }

    async fn update_conversation(
        &self,
        id: &Uuid,
        update: &ConversationUpdate,
    ) -> Result<Conversation, RepositoryError> {
        let mut conversation = self
            .maps
            .conversations
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(title) = &update.title {
            conversation.title = Some(title.clone());
        }
        conversation.updated_at = conversation.updated_at.max(Utc::now());
        Ok(conversation.clone())
    }

    async fn delete_conversation(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        // The shard lock on `conversations` is held while messages are dropped,
        // so no message can be appended between the two removals.
        let removed = self.maps.conversations.remove_if(id, |key, _| {
            self.maps.messages.remove(key);
            true
        });
        Ok(removed.is_some())
    }

    async fn list_messages(&self, conversation_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let mut messages = self
            .maps
            .messages
            .get(conversation_id)
            .map(|m| m.clone())
            .unwrap_or_default();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn create_message(&self, message: &Message) -> Result<Message, RepositoryError> {
        let mut conversation = self
            .maps
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or(RepositoryError::NotFound)?;

        self.maps
            .messages
            .entry(message.conversation_id)
            .or_default()
            .push(message.clone());

        let bumped = message.created_at.max(Utc::now());
        conversation.updated_at = conversation.updated_at.max(bumped);
        Ok(message.clone())
    }

    async fn count_messages(&self, conversation_id: &Uuid) -> Result<u64, RepositoryError> {
        Ok(self
            .maps
            .messages
            .get(conversation_id)
            .map(|m| m.len() as u64)
            .unwrap_or(0))
    }

    async fn count_conversations(&self) -> Result<u64, RepositoryError> {
        Ok(self.maps.conversations.len() as u64)
    }

    async fn count_all_messages(&self) -> Result<u64, RepositoryError> {
        Ok(self.maps.messages.iter().map(|m| m.len() as u64).sum())
    }
}
