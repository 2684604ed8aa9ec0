use crate::entities::{AnyStore, dao::ChatSession, parse_rfc3339_or_now};
use chrono::Utc;
use std::future::Future;

type SessionRow = (i64, i64, String);

pub trait SessionStore: Send + Sync + 'static {
    /// Returns the user's single session, creating it on first use.
    ///
    /// Concurrent callers for the same user always observe the same row.
    fn get_or_create_session(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<ChatSession, sqlx::Error>> + Send;
    fn find_session_by_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Option<ChatSession>, sqlx::Error>> + Send;
}

fn to_session((id, user_id, created_at): SessionRow) -> ChatSession {
    ChatSession {
        id,
        user_id,
        created_at: parse_rfc3339_or_now(&created_at, "chat_sessions.created_at"),
    }
}

impl SessionStore for AnyStore {
    async fn get_or_create_session(&self, user_id: i64) -> Result<ChatSession, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        // user_id is UNIQUE; a racing insert becomes a no-op.
        sqlx::query(
            "INSERT INTO chat_sessions (user_id, created_at) VALUES (?1, ?2) \
             ON CONFLICT(user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        let row: SessionRow = sqlx::query_as(
            "SELECT id, user_id, created_at FROM chat_sessions WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(to_session(row))
    }

    async fn find_session_by_user(&self, user_id: i64) -> Result<Option<ChatSession>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, user_id, created_at FROM chat_sessions WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(to_session))
    }
}
