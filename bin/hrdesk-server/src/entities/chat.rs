use crate::entities::dao::{ChatMessage, MessageType};
use crate::entities::{AnyStore, decode_enum, parse_rfc3339_or_now};
use chrono::Utc;
use std::future::Future;

type MessageRow = (i64, i64, String, String, String);

pub trait ChatStore: Send + Sync + 'static {
    fn append_message(
        &self,
        session_id: i64,
        message_type: MessageType,
        content: &str,
    ) -> impl Future<Output = Result<ChatMessage, sqlx::Error>> + Send;
    /// Messages in the order they were appended.
    fn list_messages(
        &self,
        session_id: i64,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;
    /// Deletes every message of the session and returns how many went.
    fn clear_messages(&self, session_id: i64) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

fn to_message(
    (id, session_id, message_type, content, created_at): MessageRow,
) -> Result<ChatMessage, sqlx::Error> {
    Ok(ChatMessage {
        id,
        session_id,
        message_type: decode_enum(&message_type)?,
        content,
        created_at: parse_rfc3339_or_now(&created_at, "chat_messages.created_at"),
    })
}

impl ChatStore for AnyStore {
    async fn append_message(
        &self,
        session_id: i64,
        message_type: MessageType,
        content: &str,
    ) -> Result<ChatMessage, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        let row: MessageRow = sqlx::query_as(
            "INSERT INTO chat_messages (session_id, message_type, content, created_at) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING id, session_id, message_type, content, created_at",
        )
        .bind(session_id)
        .bind(message_type.to_string())
        .bind(content)
        .bind(&created_at)
        .fetch_one(&self.pool)
        .await?;
        to_message(row)
    }

    async fn list_messages(&self, session_id: i64) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, session_id, message_type, content, created_at \
             FROM chat_messages WHERE session_id = ?1 ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(to_message).collect()
    }

    async fn clear_messages(&self, session_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
