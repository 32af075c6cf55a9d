//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `parley-core` using sqlx with
//! split read/write pools. The singleton invariant is enforced by a UNIQUE
//! `singleton` column; appends and resets each run in one transaction.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use parley_core::conversation::repository::ConversationRepository;
use parley_types::conversation::{Conversation, Message, MessageRole};
use parley_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Load the conversation and its messages from `executor`.
    async fn load<'e, E>(executor: E) -> Result<Option<Conversation>, RepositoryError>
    where
        E: sqlx::SqliteExecutor<'e> + Copy,
    {
        let row = sqlx::query("SELECT * FROM conversations WHERE singleton = 1")
            .fetch_optional(executor)
            .await
            .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let conversation_row = ConversationRow::from_row(&row).map_err(query_error)?;

        let message_rows = sqlx::query(
            "SELECT role, content, created_at FROM messages WHERE conversation_id = ? ORDER BY seq ASC",
        )
        .bind(&conversation_row.id)
        .fetch_all(executor)
        .await
        .map_err(query_error)?;

        let messages = message_rows
            .iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(query_error)
                    .and_then(MessageRow::into_message)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(conversation_row.into_conversation(messages)?))
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    created_at: String,
    updated_at: String,
    version: i64,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            version: row.try_get("version")?,
        })
    }

    fn into_conversation(self, messages: Vec<Message>) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;

        Ok(Conversation {
            id,
            messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            version: self.version as u64,
        })
    }
}

struct MessageRow {
    role: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(Message {
            role,
            content: self.content,
            timestamp: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

async fn insert_empty(
    executor: impl sqlx::SqliteExecutor<'_>,
    conversation: &Conversation,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"INSERT INTO conversations (id, singleton, created_at, updated_at, version)
           VALUES (?, 1, ?, ?, 0)
           ON CONFLICT(singleton) DO NOTHING"#,
    )
    .bind(conversation.id.to_string())
    .bind(format_datetime(&conversation.created_at))
    .bind(format_datetime(&conversation.updated_at))
    .execute(executor)
    .await
    .map_err(query_error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn find(&self) -> Result<Option<Conversation>, RepositoryError> {
        Self::load(&self.pool.reader).await
    }

    async fn get_or_create(&self) -> Result<Conversation, RepositoryError> {
        if let Some(conversation) = Self::load(&self.pool.reader).await? {
            return Ok(conversation);
        }

        // A concurrent creator may win; ON CONFLICT keeps theirs and we read it back.
        insert_empty(&self.pool.writer, &Conversation::empty()).await?;

        Self::load(&self.pool.writer)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn append_messages(
        &self,
        conversation_id: &Uuid,
        messages: &[Message],
    ) -> Result<Conversation, RepositoryError> {
        let id = conversation_id.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let exists = sqlx::query("SELECT 1 FROM conversations WHERE id = ?")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let next_seq: i64 = sqlx::query(
            "SELECT COALESCE(MAX(seq), -1) + 1 AS next_seq FROM messages WHERE conversation_id = ?",
        )
        .bind(&id)
        .fetch_one(&mut *tx)
        .await
        .and_then(|row| row.try_get("next_seq"))
        .map_err(query_error)?;

        for (offset, message) in messages.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO messages (conversation_id, seq, role, content, created_at)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(&id)
            .bind(next_seq + offset as i64)
            .bind(message.role.to_string())
            .bind(&message.content)
            .bind(format_datetime(&message.timestamp))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        sqlx::query("UPDATE conversations SET updated_at = ?, version = version + 1 WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;

        Self::load(&self.pool.writer)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn reset(&self) -> Result<Conversation, RepositoryError> {
        let fresh = Conversation::empty();
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query("DELETE FROM messages")
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        sqlx::query("DELETE FROM conversations")
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        insert_empty(&mut *tx, &fresh).await?;

        tx.commit().await.map_err(query_error)?;
        Ok(fresh)
    }

    async fn message_count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT COUNT(*) AS count FROM messages m
               JOIN conversations c ON c.id = m.conversation_id
               WHERE c.singleton = 1"#,
        )
        .fetch_one(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let count: i64 = row.try_get("count").map_err(query_error)?;
        Ok(count as u64)
    }
}
