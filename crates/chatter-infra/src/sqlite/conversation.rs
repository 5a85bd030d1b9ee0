//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `chatter-core` using sqlx with split
//! read/write pools. Message appends and conversation deletes each run in a
//! single transaction on the writer.

use chatter_core::repository::conversation::ConversationRepository;
use chatter_types::conversation::{Conversation, ConversationUpdate, Message, MessageRole};
use chatter_types::error::RepositoryError;
use chatter_types::user::UserId;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, map_write_error, parse_datetime};

/// SQLite-backed implementation of `ConversationRepository`.
#[derive(Clone)]
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    user_id: String,
    title: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;

        Ok(Conversation {
            id,
            user_id: UserId::from_uuid(user_id),
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct MessageRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Message {
            id,
            conversation_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl SqliteConversationRepository {
    async fn fetch_conversation(
        &self,
        executor: &sqlx::SqlitePool,
        id: &Uuid,
    ) -> Result<Conversation, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(executor)
            .await
            .map_err(query_err)?
            .ok_or(RepositoryError::NotFound)?;

        ConversationRow::from_row(&row)
            .map_err(query_err)?
            .into_conversation()
    }

    async fn count(&self, sql: &str, bind: Option<String>) -> Result<u64, RepositoryError> {
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let row = query
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_err)?;
        let count: i64 = row.try_get("cnt").map_err(query_err)?;
        Ok(count as u64)
    }
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn list_conversations(&self, user_id: &UserId) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM conversations WHERE user_id = ? ORDER BY updated_at DESC, id DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let conv_row = ConversationRow::from_row(row).map_err(query_err)?;
            conversations.push(conv_row.into_conversation()?);
        }
        Ok(conversations)
    }

    async fn get_conversation(&self, id: &Uuid) -> Result<Conversation, RepositoryError> {
        self.fetch_conversation(&self.pool.reader, id).await
    }

    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, user_id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(conversation.user_id.to_string())
        .bind(&conversation.title)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_write_error)?;

        Ok(conversation.clone())
    }

    async fn update_conversation(
        &self,
        id: &Uuid,
        update: &ConversationUpdate,
    ) -> Result<Conversation, RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE conversations
               SET title = COALESCE(?, title), updated_at = MAX(updated_at, ?)
               WHERE id = ?"#,
        )
        .bind(&update.title)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        // Read back on the writer so the caller sees its own write.
        self.fetch_conversation(&self.pool.writer, id).await
    }

    async fn delete_conversation(&self, id: &Uuid) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query("DELETE FROM messages WHERE conversation_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_messages(&self, conversation_id: &Uuid) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(query_err)?;
            messages.push(msg_row.into_message()?);
        }
        Ok(messages)
    }

    async fn create_message(&self, message: &Message) -> Result<Message, RepositoryError> {
        let bumped_at = format_datetime(&message.created_at.max(Utc::now()));
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query(
            r#"INSERT INTO messages (id, conversation_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query("UPDATE conversations SET updated_at = MAX(updated_at, ?) WHERE id = ?")
            .bind(bumped_at)
            .bind(message.conversation_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;
        Ok(message.clone())
    }

    async fn count_messages(&self, conversation_id: &Uuid) -> Result<u64, RepositoryError> {
        self.count(
            "SELECT COUNT(*) AS cnt FROM messages WHERE conversation_id = ?",
            Some(conversation_id.to_string()),
        )
        .await
    }

    async fn count_conversations(&self) -> Result<u64, RepositoryError> {
        self.count("SELECT COUNT(*) AS cnt FROM conversations", None)
            .await
    }

    async fn count_all_messages(&self) -> Result<u64, RepositoryError> {
        self.count("SELECT COUNT(*) AS cnt FROM messages", None).await
    }
}
