//! SQLite conversation store (the durable backend).
//!
//! Implements `ConversationStore` from `parley-core` over the `chat_messages`
//! table: raw queries, private Row structs, split reader/writer pool usage.
//! Rows are scoped by (chat_id, user_id).

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use parley_core::chat::store::ConversationStore;
use parley_types::chat::{ChatId, Message};
use parley_types::error::RepositoryError;
use parley_types::llm::MessageRole;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationStore`.
#[derive(Clone)]
pub struct SqliteConversationStore {
    pool: DatabasePool,
}

impl SqliteConversationStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: i64,
    chat_id: String,
    role: String,
    message: String,
    timestamp: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            role: row.try_get("role")?,
            message: row.try_get("message")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let chat_id = ChatId::parse(&self.chat_id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat_id: {e}")))?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.timestamp)?;

        Ok(Message::restore(self.id, chat_id, role, self.message, created_at))
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC timestamps sort lexically in chronological order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl ConversationStore for SqliteConversationStore {
    async fn append(&self, owner_user_id: i64, message: &Message) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO chat_messages (chat_id, user_id, role, message, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.chat_id().as_str())
        .bind(owner_user_id)
        .bind(message.role().as_str())
        .bind(message.content())
        .bind(format_datetime(&message.created_at()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn list(
        &self,
        chat_id: &ChatId,
        owner_user_id: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, chat_id, role, message, timestamp FROM chat_messages WHERE chat_id = ? AND user_id = ? ORDER BY timestamp ASC, id ASC",
        )
        .bind(chat_id.as_str())
        .bind(owner_user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_message()
            })
            .collect()
    }

    async fn delete(&self, chat_id: &ChatId, owner_user_id: i64) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id.as_str())
            .bind(owner_user_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
