//! Conversation and message types.
//!
//! A conversation belongs to exactly one user and holds an ordered sequence
//! of messages. Messages are ordered by `(created_at, id)`; ids are UUID v7 so
//! the tiebreak follows insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::user::UserId;

/// Who authored a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A conversation owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: UserId,
    /// `None` until the creator names it or the first message arrives.
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Bumped on every message append and every update.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Build a fresh conversation for `user_id` with both timestamps set to now.
    pub fn new(user_id: UserId, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            title,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` owns this conversation.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }
}

/// Partial update applied by `update_conversation`.
///
/// Fields left as `None` are untouched; the updated timestamp is always refreshed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationUpdate {
    pub title: Option<String>,
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn new(conversation_id: Uuid, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_parse_is_case_insensitive() {
        assert_eq!("User".parse::<MessageRole>().unwrap(), MessageRole::User);
        assert_eq!(
            "ASSISTANT".parse::<MessageRole>().unwrap(),
            MessageRole::Assistant
        );
        assert!("system".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde() {
        let json = serde_json::to_string(&MessageRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_new_conversation_has_matching_timestamps() {
        let conversation = Conversation::new(UserId::new(), None);
        assert_eq!(conversation.created_at, conversation.updated_at);
        assert!(conversation.title.is_none());
    }

    #[test]
    fn test_ownership() {
        let owner = UserId::new();
        let conversation = Conversation::new(owner, Some("Plans".to_string()));
        assert!(conversation.is_owned_by(&owner));
        assert!(!conversation.is_owned_by(&UserId::new()));
    }

    #[test]
    fn test_conversation_serializes_camel_case() {
        let conversation = Conversation::new(UserId::new(), None);
        let json = serde_json::to_string(&conversation).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"title\":null"));
    }
}
